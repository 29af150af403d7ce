use tiny_skia::{BlendMode, Color, Pixmap, PixmapPaint, Transform};

use super::draw_glyph;
use crate::config::EngineConfig;
use crate::glyph::GlyphSet;
use crate::lattice::{ActiveSet, Lattice};

/// Multiplies every active cell's intensity by `decay`. Cells that fall
/// below `floor` go fully dark and leave the active set.
pub fn decay_active(
    lattice: &mut Lattice,
    active: &mut ActiveSet,
    decay: f32,
    floor: f32,
) {
    active.retain(|index| {
        let Some(cell) = lattice.cell_mut(index) else {
            return false;
        };
        let next = cell.intensity() * decay;
        if next < floor {
            cell.set_intensity(0.0);
            false
        } else {
            cell.set_intensity(next);
            true
        }
    });
}

/// Owns the per-frame pixmap the host presents.
#[derive(Debug)]
pub struct Compositor {
    frame: Option<Pixmap>,
    decay: f32,
    floor: f32,
}

impl Compositor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            frame: None,
            decay: config.decay,
            floor: config.floor,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let same = self
            .frame
            .as_ref()
            .is_some_and(|f| f.width() == width && f.height() == height);
        if !same {
            self.frame = Pixmap::new(width, height);
        }
    }

    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    pub fn release(&mut self) {
        self.frame = None;
    }

    /// Clears the frame and copies the static layer into it
    pub fn begin(&mut self, static_layer: Option<&Pixmap>) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };

        match static_layer {
            Some(layer)
                if layer.width() == frame.width()
                    && layer.height() == frame.height() =>
            {
                frame.data_mut().copy_from_slice(layer.data());
            }
            Some(layer) => {
                frame.fill(Color::TRANSPARENT);
                frame.draw_pixmap(
                    0,
                    0,
                    layer.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            None => frame.fill(Color::TRANSPARENT),
        }
    }

    /// Decays the active cells and adds each survivor's neon glyph on top of
    /// the frame, weighted by its intensity. Nothing is drawn without a
    /// glyph set; a cell whose neon slot is absent is skipped.
    pub fn finish(
        &mut self,
        lattice: &mut Lattice,
        active: &mut ActiveSet,
        glyphs: Option<&GlyphSet>,
        icon_size: f32,
    ) {
        decay_active(lattice, active, self.decay, self.floor);

        let (Some(frame), Some(glyphs)) = (self.frame.as_mut(), glyphs) else {
            return;
        };

        for index in active.iter() {
            let Some(cell) = lattice.cell(index) else {
                continue;
            };
            let Some(image) = glyphs
                .get(cell.glyph_index)
                .and_then(|asset| asset.neon(cell.hue))
            else {
                continue;
            };
            draw_glyph(
                frame,
                image,
                glyphs.raster_size(),
                (cell.x, cell.y),
                icon_size,
                cell.intensity(),
                BlendMode::Plus,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::glyph::{GlyphStyle, Icon, IconCatalog};
    use crate::lattice::LatticeParams;
    use crate::theme::Theme;

    fn lattice() -> Lattice {
        let mut rng = StdRng::seed_from_u64(9);
        Lattice::build(120.0, 90.0, 1, &LatticeParams::default(), &mut rng)
    }

    fn ink(pixmap: &Pixmap) -> usize {
        pixmap.pixels().iter().filter(|px| px.alpha() > 0).count()
    }

    #[test]
    fn test_decay_removes_cells_below_floor() {
        let mut lattice = lattice();
        let mut active = ActiveSet::new(lattice.len());
        if let Some(cell) = lattice.cell_mut(4) {
            cell.ignite(120.0);
        }
        active.insert(4);

        let mut expected = 0;
        let mut level = 1.0_f32;
        while level >= 0.01 {
            level *= 0.92;
            expected += 1;
        }

        let mut ticks = 0;
        while active.contains(4) {
            decay_active(&mut lattice, &mut active, 0.92, 0.01);
            ticks += 1;
            assert!(ticks <= 1000);
        }

        assert_eq!(ticks, expected);
        assert_eq!(lattice.cells()[4].intensity(), 0.0);
    }

    #[test]
    fn test_begin_copies_static_layer() {
        let config = EngineConfig::default();
        let mut compositor = Compositor::new(&config);
        compositor.resize(8, 8);

        let mut layer = Pixmap::new(8, 8).unwrap();
        layer.fill(Color::from_rgba8(10, 20, 30, 255));
        compositor.begin(Some(&layer));
        assert_eq!(compositor.frame().unwrap().data(), layer.data());

        compositor.begin(None);
        assert_eq!(ink(compositor.frame().unwrap()), 0);
    }

    #[test]
    fn test_nothing_drawn_without_glyphs() {
        let config = EngineConfig::default();
        let mut lattice = lattice();
        let mut active = ActiveSet::new(lattice.len());
        let mut compositor = Compositor::new(&config);
        compositor.resize(120, 90);

        for index in 0..lattice.len() {
            if let Some(cell) = lattice.cell_mut(index) {
                cell.ignite(120.0);
            }
            active.insert(index);
        }

        compositor.begin(None);
        compositor.finish(&mut lattice, &mut active, None, 20.0);
        assert_eq!(ink(compositor.frame().unwrap()), 0);
        // Decay still runs
        assert!(lattice.cells()[0].intensity() < 1.0);
    }

    #[test]
    fn test_lit_cells_are_drawn_additively() {
        let config = EngineConfig::default();
        let catalog =
            IconCatalog::new().with(Icon::new("ring").circle(12.0, 12.0, 8.0));
        let style = GlyphStyle::new(&config, Theme::Dark);
        let glyphs = GlyphSet::rasterize(&catalog, &style);

        let mut lattice = lattice();
        let mut active = ActiveSet::new(lattice.len());
        let mut compositor = Compositor::new(&config);
        compositor.resize(120, 90);

        compositor.begin(None);
        compositor.finish(&mut lattice, &mut active, Some(&glyphs), 20.0);
        assert_eq!(ink(compositor.frame().unwrap()), 0);

        let target = lattice
            .cells()
            .iter()
            .position(|c| c.row == 1 && c.col == 1)
            .unwrap();
        if let Some(cell) = lattice.cell_mut(target) {
            cell.ignite(190.0);
        }
        active.insert(target);

        compositor.begin(None);
        compositor.finish(&mut lattice, &mut active, Some(&glyphs), 20.0);
        assert!(ink(compositor.frame().unwrap()) > 0);
    }
}
