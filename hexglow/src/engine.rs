//! The engine context: one owned value that holds every piece of backdrop
//! state and advances it one frame at a time.
//!
//! Hosts drive it through a handful of calls:
//!
//! - [`Engine::init`] once the viewport size is known
//! - [`Engine::tick`] once per frame
//! - [`Engine::resize`] and [`Engine::on_theme_change`] whenever the host
//!   changes
//! - [`Engine::on_pointer_move`] and [`Engine::on_click`] for input
//! - [`Engine::dispose`] on teardown
//!
//! Resize and theme notifications are queued and applied at the start of the
//! next tick so a rebuild never lands in the middle of a frame. Rebuilds wait
//! for a glyph set: until the first one is rasterized the frame stays empty.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tiny_skia::Pixmap;

use crate::config::EngineConfig;
use crate::glyph::{GlyphCache, GlyphSet, GlyphStyle, IconCatalog};
use crate::input::{
    ClickOutcome, ClickTargets, InputRouter, InteractiveRegions,
};
use crate::lattice::{ActiveSet, Lattice, LatticeParams};
use crate::motion::{RippleEngine, WanderParams, WanderScheduler};
use crate::render::{Compositor, render_static_layer};
use crate::theme::Theme;
use crate::{debug_throttled, warn_once};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEvent {
    ThemeChanged(Theme),
    Resized { width: u32, height: u32 },
}

pub struct Engine {
    config: EngineConfig,
    catalog: Arc<IconCatalog>,
    theme: Theme,
    width: u32,
    height: u32,
    events: VecDeque<EngineEvent>,
    glyphs: GlyphCache,
    lattice: Lattice,
    active: ActiveSet,
    static_layer: Option<Pixmap>,
    ripples: RippleEngine,
    wander: WanderScheduler,
    compositor: Compositor,
    input: InputRouter,
    rng: StdRng,
    needs_rebuild: bool,
    initialized: bool,
    disposed: bool,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        catalog: IconCatalog,
        theme: Theme,
    ) -> Self {
        let rng = seeded_rng(&config);
        Self {
            lattice: Lattice::empty(0.0, 0.0, config.hex_radius),
            ripples: RippleEngine::new(&config),
            wander: WanderScheduler::new(WanderParams::from_config(&config)),
            compositor: Compositor::new(&config),
            config,
            catalog: Arc::new(catalog),
            theme,
            width: 0,
            height: 0,
            events: VecDeque::new(),
            glyphs: GlyphCache::new(),
            active: ActiveSet::default(),
            static_layer: None,
            input: InputRouter::new(),
            rng,
            needs_rebuild: false,
            initialized: false,
            disposed: false,
        }
    }

    /// Sizes every buffer for the viewport and starts rasterizing glyphs.
    /// The lattice is built on the first tick after the glyphs are ready.
    pub fn init(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }

        info!(
            "initializing {}x{} backdrop with {} icons ({} theme)",
            width,
            height,
            self.catalog.len(),
            self.theme
        );

        self.initialized = true;
        self.apply_size(width, height);
        self.request_glyphs();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.disposed {
            self.events.push_back(EngineEvent::Resized { width, height });
        }
    }

    pub fn on_theme_change(&mut self, theme: Theme) {
        if !self.disposed {
            self.events.push_back(EngineEvent::ThemeChanged(theme));
        }
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.input.on_pointer_move(x, y);
    }

    pub fn on_pointer_leave(&mut self) {
        self.input.on_pointer_leave();
    }

    pub fn on_click(&mut self, x: f32, y: f32) -> ClickOutcome {
        if self.disposed {
            return ClickOutcome::Miss;
        }

        let outcome = self.input.on_click(
            x,
            y,
            &self.config,
            ClickTargets {
                lattice: &mut self.lattice,
                active: &mut self.active,
                ripples: &mut self.ripples,
            },
        );
        debug!("click at ({:.0}, {:.0}): {:?}", x, y, outcome);
        outcome
    }

    /// Advances one frame. `now` is in seconds on any monotonic clock the
    /// host keeps. Returns false once the engine is disposed.
    pub fn tick(&mut self, now: f32) -> bool {
        if self.disposed {
            return false;
        }

        while let Some(event) = self.events.pop_front() {
            self.apply_event(event);
        }

        if self.glyphs.poll() {
            self.needs_rebuild = true;
        }
        if self.needs_rebuild {
            self.rebuild();
        }

        self.compositor.begin(self.static_layer.as_ref());

        if !self.lattice.is_empty() {
            self.ripples.advance(&mut self.lattice, &mut self.active);
            self.wander.advance(
                now,
                &mut self.lattice,
                &mut self.active,
                &mut self.rng,
            );
        }

        let icon_size = self.icon_size();
        self.compositor.finish(
            &mut self.lattice,
            &mut self.active,
            self.glyphs.current(),
            icon_size,
        );

        debug_throttled!(
            5000,
            "{} ripple(s), {} lit cell(s)",
            self.ripples.len(),
            self.active.len()
        );

        true
    }

    /// Cancels any glyph work and releases every buffer. Further ticks are
    /// rejected.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.disposed = true;
        self.events.clear();
        self.glyphs.clear();
        self.lattice = Lattice::empty(0.0, 0.0, self.config.hex_radius);
        self.active.reset(0);
        self.static_layer = None;
        self.ripples.clear();
        self.wander.reset();
        self.compositor.release();
        self.input.regions_mut().clear();
        info!("backdrop disposed");
    }

    /// Blocks until an in-flight glyph build lands or `timeout` passes.
    /// Returns true when a new glyph set was installed.
    pub fn wait_for_glyphs(&mut self, timeout: Duration) -> bool {
        let changed = self.glyphs.wait(timeout);
        if changed {
            self.needs_rebuild = true;
        }
        changed
    }

    /// Swaps the configuration and rebuilds everything that depends on it
    pub fn set_config(&mut self, config: EngineConfig) {
        if self.disposed {
            return;
        }

        info!("applying new engine configuration");
        self.ripples = RippleEngine::new(&config);
        self.ripples
            .set_viewport(self.width as f32, self.height as f32);
        self.wander = WanderScheduler::new(WanderParams::from_config(&config));
        self.compositor = Compositor::new(&config);
        self.compositor.resize(self.width, self.height);
        if config.seed.is_some() && config.seed != self.config.seed {
            self.rng = seeded_rng(&config);
        }
        self.config = config;

        if self.initialized {
            self.needs_rebuild = true;
            self.request_glyphs();
        }
    }

    pub fn frame(&self) -> Option<&Pixmap> {
        self.compositor.frame()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn glyphs(&self) -> Option<&GlyphSet> {
        self.glyphs.current()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn ripples(&self) -> &RippleEngine {
        &self.ripples
    }

    pub fn active_cells(&self) -> &ActiveSet {
        &self.active
    }

    pub fn regions(&self) -> &InteractiveRegions {
        self.input.regions()
    }

    pub fn regions_mut(&mut self) -> &mut InteractiveRegions {
        self.input.regions_mut()
    }

    pub fn hovered_region(&self) -> Option<&str> {
        self.input.hovered_region()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn icon_size(&self) -> f32 {
        self.config.hex_radius * self.config.icon_scale
    }

    fn apply_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::ThemeChanged(theme) => {
                if theme == self.theme {
                    return;
                }
                info!("theme changed to {}", theme);
                self.theme = theme;
                if self.initialized {
                    self.request_glyphs();
                }
            }
            EngineEvent::Resized { width, height } => {
                if (width, height) == (self.width, self.height) {
                    return;
                }
                debug!("viewport resized to {}x{}", width, height);
                self.apply_size(width, height);
                self.needs_rebuild = true;
            }
        }
    }

    fn apply_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.compositor.resize(width, height);
        self.ripples.set_viewport(width as f32, height as f32);
    }

    fn request_glyphs(&mut self) {
        let style = GlyphStyle::new(&self.config, self.theme);
        self.glyphs.request(self.catalog.clone(), style);
    }

    /// Rebuilds the lattice and static layer against the current glyph set.
    /// Without a glyph set the rebuild stays pending.
    fn rebuild(&mut self) {
        let Some(glyphs) = self.glyphs.current() else {
            debug!("rebuild deferred until glyphs are ready");
            return;
        };
        self.needs_rebuild = false;

        let params = LatticeParams {
            radius: self.config.hex_radius,
            neighbor_tolerance: self.config.neighbor_tolerance,
            max_passes: self.config.max_passes,
            random_passes: self.config.random_passes,
        };
        self.lattice = Lattice::build(
            self.width as f32,
            self.height as f32,
            glyphs.len(),
            &params,
            &mut self.rng,
        );

        let report = self.lattice.validate();
        info!(
            "built {} cells over {} glyphs; conflicts resolved in {} pass(es)",
            self.lattice.len(),
            glyphs.len(),
            self.lattice.passes()
        );
        if report.is_clean() {
            info!("lattice validated: no neighboring duplicates");
        } else {
            warn!("lattice has residual glyph conflicts: {}", report);
        }

        self.active.reset(self.lattice.len());
        self.ripples.clear();
        self.wander.reset();

        let grid_color = self.config.grid_color(glyphs.theme());
        let icon_size = self.config.hex_radius * self.config.icon_scale;
        self.static_layer = render_static_layer(
            &self.lattice,
            Some(glyphs),
            grid_color,
            icon_size,
        );
        if self.static_layer.is_none() && !self.lattice.is_empty() {
            warn_once!("static layer could not be allocated");
        }
    }
}

fn seeded_rng(config: &EngineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Icon;

    fn catalog(count: usize) -> IconCatalog {
        (0..count)
            .map(|i| {
                Icon::new(format!("icon-{}", i))
                    .circle(12.0, 12.0, 2.0 + i as f32)
            })
            .collect()
    }

    fn engine(theme: Theme) -> Engine {
        let config = EngineConfig {
            seed: Some(42),
            ..EngineConfig::default()
        };
        Engine::new(config, catalog(7), theme)
    }

    fn ready(engine: &mut Engine) {
        assert!(engine.wait_for_glyphs(Duration::from_secs(10)));
        assert!(engine.tick(0.0));
    }

    #[test]
    fn test_nothing_is_built_before_glyphs() {
        let mut engine = engine(Theme::Light);
        engine.init(400, 300);

        assert!(engine.lattice().is_empty());
        assert_eq!(engine.on_click(10.0, 10.0), ClickOutcome::Miss);
    }

    #[test]
    fn test_lattice_is_built_once_glyphs_land() {
        let mut engine = engine(Theme::Light);
        engine.init(400, 300);
        ready(&mut engine);

        assert_eq!(engine.lattice().len(), 143);
        assert!(engine.lattice().validate().is_clean());
        let frame = engine.frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (400, 300));
        // The first wander batch starts on the first tick
        assert_eq!(engine.wander.items().len(), 14);
    }

    #[test]
    fn test_resize_is_applied_on_next_tick() {
        let mut engine = engine(Theme::Light);
        engine.init(400, 300);
        ready(&mut engine);

        engine.resize(200, 100);
        assert_eq!(engine.size(), (400, 300));
        engine.tick(0.1);

        assert_eq!(engine.size(), (200, 100));
        assert!(engine.lattice().len() < 143);
        assert_eq!(engine.frame().unwrap().width(), 200);
    }

    #[test]
    fn test_theme_change_swaps_glyphs_and_rebuilds() {
        let mut engine = engine(Theme::Light);
        engine.init(400, 300);
        ready(&mut engine);

        engine.on_theme_change(Theme::Dark);
        engine.tick(0.1);
        assert_eq!(engine.theme(), Theme::Dark);
        // Some set keeps serving while the new one rasterizes
        assert!(engine.glyphs().is_some());

        engine.wait_for_glyphs(Duration::from_secs(10));
        engine.tick(0.2);
        assert_eq!(engine.glyphs().map(GlyphSet::theme), Some(Theme::Dark));
        assert_eq!(engine.lattice().len(), 143);
    }

    #[test]
    fn test_rebuild_clears_motion_state() {
        let mut engine = engine(Theme::Light);
        engine.init(400, 300);
        ready(&mut engine);

        // Wander lights cells at staggered offsets within the first period
        let mut now = 0.0;
        let lit = loop {
            now += 0.1;
            engine.tick(now);
            let bright = engine
                .active_cells()
                .iter()
                .find(|&i| engine.lattice().cells()[i].intensity() > 0.5);
            if let Some(index) = bright {
                break index;
            }
            assert!(now < 20.0);
        };
        let cell = engine.lattice().cells()[lit].clone();
        assert_eq!(
            engine.on_click(cell.x, cell.y),
            ClickOutcome::Spawned {
                cell: Some(lit),
                hue: cell.hue
            }
        );
        assert_eq!(engine.ripples().len(), 1);

        engine.resize(300, 300);
        engine.tick(0.1);
        assert!(engine.ripples().is_empty());
    }

    #[test]
    fn test_disposed_engine_rejects_ticks() {
        let mut engine = engine(Theme::Dark);
        engine.init(400, 300);
        ready(&mut engine);

        engine.dispose();
        assert!(engine.is_disposed());
        assert!(!engine.tick(1.0));
        assert!(engine.frame().is_none());
        assert!(engine.lattice().is_empty());
        assert_eq!(engine.on_click(10.0, 10.0), ClickOutcome::Miss);
    }
}
