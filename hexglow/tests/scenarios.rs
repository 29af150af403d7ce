use std::sync::Arc;
use std::time::Duration;

use hexglow::config::EngineConfig;
use hexglow::glyph::{GlyphCache, GlyphStyle, Icon, IconCatalog};
use hexglow::input::{ClickOutcome, ClickTargets, InputRouter};
use hexglow::lattice::{ActiveSet, Lattice, LatticeParams};
use hexglow::motion::{
    Ripple, RippleEngine, WanderItem, step_ripple, step_wander,
};
use hexglow::render::decay_active;
use hexglow::{Engine, Theme};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn build(width: f32, height: f32, glyphs: usize, seed: u64) -> Lattice {
    let mut rng = StdRng::seed_from_u64(seed);
    Lattice::build(width, height, glyphs, &LatticeParams::default(), &mut rng)
}

fn catalog(count: usize) -> IconCatalog {
    (0..count)
        .map(|i| {
            Icon::new(format!("ring-{}", i)).circle(12.0, 12.0, 3.0 + i as f32)
        })
        .collect()
}

#[test]
fn five_glyphs_color_a_400x300_viewport() {
    for seed in 0..500 {
        let lattice = build(400.0, 300.0, 5, seed);

        for cell in lattice.cells() {
            assert!(
                (2..=6).contains(&cell.neighbors.len()),
                "cell ({}, {}) has {} neighbors",
                cell.row,
                cell.col,
                cell.neighbors.len()
            );
            assert!(!cell.conflict);
        }
        assert!(lattice.validate().is_clean(), "seed {}", seed);
    }
}

#[test]
fn few_glyphs_still_color_cleanly() {
    let sizes = [(400.0, 300.0), (640.0, 480.0), (1024.0, 768.0)];
    for glyphs in 3..=6 {
        for (width, height) in sizes {
            for seed in 0..20 {
                let lattice = build(width, height, glyphs, seed);
                let report = lattice.validate();
                assert!(
                    report.is_clean(),
                    "{} glyphs, {}x{}, seed {}: {}",
                    glyphs,
                    width,
                    height,
                    seed,
                    report
                );
                assert_eq!(report.flagged, 0);
            }
        }
    }
}

#[test]
fn seven_glyphs_never_repeat_between_neighbors() {
    for seed in 0..8 {
        let lattice = build(1024.0, 768.0, 7, seed);
        for cell in lattice.cells() {
            for &n in &cell.neighbors {
                assert_ne!(cell.glyph_index, lattice.cells()[n].glyph_index);
            }
        }
    }
}

#[test]
fn ripple_accelerates_from_its_first_step() {
    let mut ripple = Ripple {
        x: 0.0,
        y: 0.0,
        radius: 0.0,
        speed: 10.0,
        acceleration: 0.5,
        max_radius: 1000.0,
        hue: 120.0,
    };

    step_ripple(&mut ripple, 1.5);
    assert_eq!(ripple.radius, 10.0);
    step_ripple(&mut ripple, 1.5);
    assert_eq!(ripple.radius, 20.5);
}

#[test]
fn ripple_is_removed_once_past_the_diagonal() {
    let config = EngineConfig::default();
    let mut lattice = build(300.0, 200.0, 7, 3);
    let mut active = ActiveSet::new(lattice.len());
    let mut ripples = RippleEngine::new(&config);
    ripples.set_viewport(300.0, 200.0);
    ripples.spawn(150.0, 100.0, 190.0);

    let mut last_radius = 0.0;
    let mut ticks = 0;
    while let Some(ripple) = ripples.ripples().first().copied() {
        assert!(ripple.radius >= last_radius);
        assert!(ripple.radius <= ripple.max_radius);
        last_radius = ripple.radius;
        ripples.advance(&mut lattice, &mut active);
        ticks += 1;
        assert!(ticks < 1000);
    }

    // The ripple swept the whole viewport on its way out
    assert!(active.len() > lattice.len() / 2);
    for index in active.iter() {
        assert_eq!(lattice.cells()[index].hue, 190.0);
    }
}

#[test]
fn clicks_only_count_on_lit_cells() {
    let config = EngineConfig::default();
    let mut lattice = build(400.0, 300.0, 7, 11);
    let mut active = ActiveSet::new(lattice.len());
    let mut ripples = RippleEngine::new(&config);
    ripples.set_viewport(400.0, 300.0);
    let mut router = InputRouter::new();

    let index = lattice.hit_test(200.0, 150.0).unwrap();
    let (x, y) = {
        let cell = &lattice.cells()[index];
        (cell.x, cell.y)
    };

    if let Some(cell) = lattice.cell_mut(index) {
        cell.hue = 280.0;
        cell.set_intensity(0.3);
    }
    let outcome = router.on_click(
        x,
        y,
        &config,
        ClickTargets {
            lattice: &mut lattice,
            active: &mut active,
            ripples: &mut ripples,
        },
    );
    assert_eq!(outcome, ClickOutcome::Dim);
    assert!(ripples.is_empty());

    if let Some(cell) = lattice.cell_mut(index) {
        cell.set_intensity(0.9);
    }
    let outcome = router.on_click(
        x,
        y,
        &config,
        ClickTargets {
            lattice: &mut lattice,
            active: &mut active,
            ripples: &mut ripples,
        },
    );
    assert_eq!(
        outcome,
        ClickOutcome::Spawned {
            cell: Some(index),
            hue: 280.0
        }
    );
    assert_eq!(ripples.len(), 1);
    assert_eq!(ripples.ripples()[0].hue, 280.0);
}

#[test]
fn lit_cell_decays_to_dark_and_leaves_the_active_set() {
    let mut lattice = build(200.0, 200.0, 7, 5);
    let mut active = ActiveSet::new(lattice.len());
    if let Some(cell) = lattice.cell_mut(0) {
        cell.ignite(60.0);
    }
    active.insert(0);

    let mut expected = 0;
    let mut level = 1.0_f32;
    while level >= 0.01 {
        level *= 0.92;
        expected += 1;
    }

    let mut ticks = 0;
    while !active.is_empty() {
        decay_active(&mut lattice, &mut active, 0.92, 0.01);
        let intensity = lattice.cells()[0].intensity();
        assert!((0.0..=1.0).contains(&intensity));
        ticks += 1;
    }

    assert_eq!(ticks, expected);
    assert_eq!(lattice.cells()[0].intensity(), 0.0);
}

#[test]
fn overlapping_activations_register_a_cell_once() {
    let mut lattice = build(200.0, 200.0, 7, 6);
    let mut active = ActiveSet::new(lattice.len());
    let mut items = vec![
        WanderItem {
            cell: 4,
            start: 0.0,
            end: 2.0,
            hue: 120.0,
            activated: false,
        },
        WanderItem {
            cell: 4,
            start: 1.0,
            end: 3.0,
            hue: 300.0,
            activated: false,
        },
    ];

    assert_eq!(step_wander(&mut items, 1.5, &mut lattice, &mut active), 2);
    assert_eq!(active.len(), 1);
    assert!(!active.insert(4));
    assert_eq!(lattice.cells()[4].intensity(), 1.0);

    // Re-entering a live window is not a new activation
    assert_eq!(step_wander(&mut items, 1.6, &mut lattice, &mut active), 0);
    assert_eq!(active.len(), 1);
}

#[test]
fn newer_glyph_request_supersedes_older() {
    let config = EngineConfig::default();
    let catalog = Arc::new(catalog(6));
    let mut cache = GlyphCache::new();

    cache.request(catalog.clone(), GlyphStyle::new(&config, Theme::Light));
    let latest =
        cache.request(catalog.clone(), GlyphStyle::new(&config, Theme::Dark));

    assert!(cache.wait(Duration::from_secs(10)));
    let glyphs = cache.current().unwrap();
    assert_eq!(glyphs.generation(), latest);
    assert_eq!(glyphs.theme(), Theme::Dark);
    assert_eq!(glyphs.len(), 6);
    assert_eq!(glyphs.absent_slots(), 0);
}

#[test]
fn engine_runs_frames_after_glyphs_land() {
    let config = EngineConfig {
        seed: Some(7),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config, catalog(8), Theme::Dark);
    engine.init(320, 240);
    assert!(engine.wait_for_glyphs(Duration::from_secs(10)));

    for frame in 0..30 {
        assert!(engine.tick(frame as f32 / 30.0));
    }

    let frame = engine.frame().unwrap();
    assert_eq!((frame.width(), frame.height()), (320, 240));
    assert!(frame.pixels().iter().any(|px| px.alpha() > 0));
    assert!(engine.lattice().validate().is_clean());
    for cell in engine.lattice().cells() {
        assert!((0.0..=1.0).contains(&cell.intensity()));
    }
}
