use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rayon::prelude::*;
use tiny_skia::{LineCap, LineJoin, Paint, Path, Pixmap, Stroke, Transform};

use super::icon::{Icon, IconCatalog, VIEW_BOX};
use crate::config::EngineConfig;
use crate::framework::util::{hsl_to_rgb8, same_hue};
use crate::theme::Theme;

/// Glyphs are rasterized larger than they are drawn so downscaling keeps
/// strokes crisp.
pub const RASTER_SCALE: f32 = 1.2;

const GLOW_WIDTH_FACTOR: f32 = 3.0;
const GLOW_ALPHA: u8 = 60;

/// Everything that decides how a glyph looks. Changing any of it requires a
/// new glyph set.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphStyle {
    pub theme: Theme,
    pub palette: Vec<f32>,
    /// Edge length of the square glyph area in pixels, excluding padding
    pub raster_size: u32,
    pub base_stroke: f32,
    pub neon_stroke: f32,
    pub glow: bool,
}

impl GlyphStyle {
    pub fn new(config: &EngineConfig, theme: Theme) -> Self {
        Self {
            theme,
            palette: config.palette.clone(),
            raster_size: (config.hex_radius * RASTER_SCALE).round().max(1.0)
                as u32,
            base_stroke: config.base_stroke,
            neon_stroke: config.neon_stroke,
            glow: config.glow,
        }
    }

    fn scale(&self) -> f32 {
        self.raster_size as f32 / VIEW_BOX
    }

    /// Room around the glyph area so round caps and the glow are not clipped
    fn padding(&self) -> u32 {
        let widest = widest_stroke(self) * self.scale();
        (widest / 2.0).ceil() as u32 + 1
    }
}

fn widest_stroke(style: &GlyphStyle) -> f32 {
    let neon = if style.glow {
        style.neon_stroke * GLOW_WIDTH_FACTOR
    } else {
        style.neon_stroke
    };
    neon.max(style.base_stroke)
}

/// The rasterized forms of one icon. Any slot may be absent when it failed
/// to rasterize; drawing code skips absent slots.
#[derive(Clone, Debug)]
pub struct GlyphAsset {
    base: Option<Pixmap>,
    neons: Vec<(f32, Option<Pixmap>)>,
}

impl GlyphAsset {
    pub fn rasterize(icon: &Icon, style: &GlyphStyle) -> Self {
        let outline = match icon.outline() {
            Ok(outline) => Some(outline),
            Err(err) => {
                warn!("icon '{}' cannot be drawn: {}", icon.name(), err);
                None
            }
        };

        let Some(outline) = outline else {
            return Self {
                base: None,
                neons: style.palette.iter().map(|hue| (*hue, None)).collect(),
            };
        };

        let base = rasterize_slot(
            &outline,
            style,
            style.theme.base_tint(),
            style.base_stroke,
            false,
        );

        let neons = style
            .palette
            .iter()
            .map(|hue| {
                let [r, g, b] = hsl_to_rgb8(*hue, 1.0, 0.6);
                let image = rasterize_slot(
                    &outline,
                    style,
                    [r, g, b, 255],
                    style.neon_stroke,
                    style.glow,
                );
                (*hue, image)
            })
            .collect();

        Self { base, neons }
    }

    pub fn base(&self) -> Option<&Pixmap> {
        self.base.as_ref()
    }

    pub fn neon(&self, hue: f32) -> Option<&Pixmap> {
        self.neons
            .iter()
            .find(|(h, _)| same_hue(*h, hue))
            .and_then(|(_, image)| image.as_ref())
    }

    pub fn absent_slots(&self) -> usize {
        let base = usize::from(self.base.is_none());
        base + self.neons.iter().filter(|(_, image)| image.is_none()).count()
    }
}

fn rasterize_slot(
    outline: &Path,
    style: &GlyphStyle,
    [r, g, b, a]: [u8; 4],
    stroke_width: f32,
    glow: bool,
) -> Option<Pixmap> {
    let padding = style.padding();
    let side = style.raster_size + padding * 2;
    let mut pixmap = Pixmap::new(side, side)?;

    let scale = style.scale();
    let transform = Transform::from_scale(scale, scale)
        .post_translate(padding as f32, padding as f32);

    let mut paint = Paint::default();
    paint.anti_alias = true;

    let mut stroke = Stroke {
        width: stroke_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    if glow {
        paint.set_color_rgba8(r, g, b, GLOW_ALPHA);
        stroke.width = stroke_width * GLOW_WIDTH_FACTOR;
        pixmap.stroke_path(outline, &paint, &stroke, transform, None);
        stroke.width = stroke_width;
    }

    paint.set_color_rgba8(r, g, b, a);
    pixmap.stroke_path(outline, &paint, &stroke, transform, None);

    Some(pixmap)
}

/// One complete rasterization of an icon catalog, indexed like the catalog.
#[derive(Clone, Debug)]
pub struct GlyphSet {
    theme: Theme,
    generation: u64,
    raster_size: u32,
    assets: Vec<GlyphAsset>,
}

impl GlyphSet {
    pub fn rasterize(catalog: &IconCatalog, style: &GlyphStyle) -> Self {
        Self::rasterize_until(catalog, style, 0, &|| false)
            .unwrap_or_else(|| Self::empty(style, 0))
    }

    /// Rasterizes icons in parallel. Returns `None` as soon as `cancelled`
    /// reports true.
    pub fn rasterize_until(
        catalog: &IconCatalog,
        style: &GlyphStyle,
        generation: u64,
        cancelled: &(dyn Fn() -> bool + Sync),
    ) -> Option<Self> {
        let assets = catalog
            .icons()
            .par_iter()
            .map(|icon| {
                if cancelled() {
                    None
                } else {
                    Some(GlyphAsset::rasterize(icon, style))
                }
            })
            .collect::<Option<Vec<_>>>()?;

        let absent: usize = assets.iter().map(GlyphAsset::absent_slots).sum();
        if absent > 0 {
            warn!(
                "{} glyph slot(s) failed to rasterize and will be skipped",
                absent
            );
        }

        Some(Self {
            theme: style.theme,
            generation,
            raster_size: style.raster_size,
            assets,
        })
    }

    fn empty(style: &GlyphStyle, generation: u64) -> Self {
        Self {
            theme: style.theme,
            generation,
            raster_size: style.raster_size,
            assets: vec![],
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raster_size(&self) -> u32 {
        self.raster_size
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GlyphAsset> {
        self.assets.get(index)
    }

    pub fn absent_slots(&self) -> usize {
        self.assets.iter().map(GlyphAsset::absent_slots).sum()
    }
}

struct PendingBuild {
    generation: u64,
    theme: Theme,
    rx: Receiver<GlyphSet>,
}

/// Owns the glyph set in use and at most one build in flight.
///
/// The current set keeps serving draws until a newer one arrives. Every
/// request bumps a shared generation counter; workers poll it between icons
/// and give up once they are stale, and results from older generations are
/// dropped on arrival.
pub struct GlyphCache {
    current: Option<GlyphSet>,
    pending: Option<PendingBuild>,
    latest: Arc<AtomicU64>,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphCache {
    pub fn new() -> Self {
        Self {
            current: None,
            pending: None,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current(&self) -> Option<&GlyphSet> {
        self.current.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts rasterizing on a worker thread and returns the request's
    /// generation. Supersedes any build still in flight.
    pub fn request(
        &mut self,
        catalog: Arc<IconCatalog>,
        style: GlyphStyle,
    ) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let theme = style.theme;
        let (tx, rx) = mpsc::channel();
        let latest = self.latest.clone();

        debug!(
            "requesting glyph set generation {} ({} icons, {} theme)",
            generation,
            catalog.len(),
            theme
        );

        let worker_catalog = catalog.clone();
        let worker_style = style.clone();
        let spawned = thread::Builder::new()
            .name("hexglow-glyphs".to_string())
            .spawn(move || {
                let stale = || latest.load(Ordering::SeqCst) != generation;
                let set = GlyphSet::rasterize_until(
                    &worker_catalog,
                    &worker_style,
                    generation,
                    &stale,
                );
                match set {
                    // The receiver is gone when a newer request replaced it
                    Some(set) => {
                        let _ = tx.send(set);
                    }
                    None => debug!(
                        "glyph set generation {} superseded",
                        generation
                    ),
                }
            });

        match spawned {
            Ok(_) => {
                self.pending = Some(PendingBuild {
                    generation,
                    theme,
                    rx,
                });
            }
            Err(err) => {
                warn!(
                    "failed to spawn glyph worker, rasterizing inline: {}",
                    err
                );
                let set = GlyphSet::rasterize_until(
                    &catalog,
                    &style,
                    generation,
                    &|| false,
                )
                .unwrap_or_else(|| GlyphSet::empty(&style, generation));
                self.pending = None;
                self.install(set);
            }
        }

        generation
    }

    /// Installs a finished build if one has arrived. Returns true when the
    /// current set changed.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };

        match pending.rx.try_recv() {
            Ok(set) => {
                self.pending = None;
                self.install(set)
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!(
                    "glyph worker for generation {} ({} theme) exited \
                     without a result",
                    pending.generation, pending.theme
                );
                self.pending = None;
                false
            }
        }
    }

    /// Blocks until the in-flight build finishes or `timeout` passes.
    /// Returns true when the current set changed.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };

        match pending.rx.recv_timeout(timeout) {
            Ok(set) => {
                self.pending = None;
                self.install(set)
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.pending = None;
                false
            }
        }
    }

    /// Abandons the in-flight build, if any. The current set is kept.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.latest.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Drops everything, including the current set.
    pub fn clear(&mut self) {
        self.cancel();
        self.current = None;
    }

    fn install(&mut self, set: GlyphSet) -> bool {
        if set.generation != self.latest.load(Ordering::SeqCst) {
            debug!("discarding stale glyph set {}", set.generation);
            return false;
        }

        info!(
            "glyph set generation {} ready: {} glyphs, {} theme",
            set.generation,
            set.len(),
            set.theme
        );
        self.current = Some(set);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IconCatalog {
        IconCatalog::new()
            .with(Icon::new("bolt").path("M13 2 3 14h9l-1 8 10-12h-9l1-8z"))
            .with(Icon::new("ring").circle(12.0, 12.0, 9.0))
            .with(Icon::new("broken").path("M4 4 L"))
    }

    fn style(theme: Theme) -> GlyphStyle {
        GlyphStyle::new(&EngineConfig::default(), theme)
    }

    fn has_ink(pixmap: &Pixmap) -> bool {
        pixmap.pixels().iter().any(|px| px.alpha() > 0)
    }

    #[test]
    fn test_style_sizes_follow_radius() {
        let style = style(Theme::Dark);
        assert_eq!(style.raster_size, 30);
        assert_eq!(style.palette.len(), 5);
    }

    #[test]
    fn test_rasterize_fills_every_slot() {
        let style = style(Theme::Dark);
        let asset = GlyphAsset::rasterize(
            &Icon::new("ring").circle(12.0, 12.0, 9.0),
            &style,
        );

        assert_eq!(asset.absent_slots(), 0);
        assert!(has_ink(asset.base().unwrap()));
        for hue in &style.palette {
            assert!(has_ink(asset.neon(*hue).unwrap()));
        }
        assert!(asset.neon(10.0).is_none());
    }

    #[test]
    fn test_bad_icon_resolves_to_absent_slots() {
        let style = style(Theme::Light);
        let set = GlyphSet::rasterize(&catalog(), &style);

        assert_eq!(set.len(), 3);
        let broken = set.get(2).unwrap();
        assert!(broken.base().is_none());
        assert_eq!(broken.absent_slots(), 1 + style.palette.len());
        assert_eq!(set.absent_slots(), broken.absent_slots());
    }

    #[test]
    fn test_neon_is_brighter_than_base() {
        let style = style(Theme::Dark);
        let asset = GlyphAsset::rasterize(
            &Icon::new("ring").circle(12.0, 12.0, 9.0),
            &style,
        );
        let max_alpha = |pixmap: &Pixmap| {
            pixmap.pixels().iter().map(|px| px.alpha()).max().unwrap_or(0)
        };

        assert!(
            max_alpha(asset.neon(120.0).unwrap())
                > max_alpha(asset.base().unwrap())
        );
    }

    #[test]
    fn test_cancelled_build_returns_nothing() {
        let set = GlyphSet::rasterize_until(
            &catalog(),
            &style(Theme::Dark),
            7,
            &|| true,
        );
        assert!(set.is_none());
    }

    #[test]
    fn test_cache_installs_requested_set() {
        let mut cache = GlyphCache::new();
        assert!(cache.current().is_none());

        let generation =
            cache.request(Arc::new(catalog()), style(Theme::Dark));
        assert!(cache.wait(Duration::from_secs(10)));

        let set = cache.current().unwrap();
        assert_eq!(set.generation(), generation);
        assert_eq!(set.theme(), Theme::Dark);
        assert!(!cache.is_pending());
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut cache = GlyphCache::new();
        let catalog = Arc::new(catalog());

        cache.request(catalog.clone(), style(Theme::Dark));
        let second = cache.request(catalog, style(Theme::Light));
        assert!(cache.wait(Duration::from_secs(10)));

        let set = cache.current().unwrap();
        assert_eq!(set.generation(), second);
        assert_eq!(set.theme(), Theme::Light);
    }

    #[test]
    fn test_cancel_keeps_current_set() {
        let mut cache = GlyphCache::new();
        let catalog = Arc::new(catalog());

        cache.request(catalog.clone(), style(Theme::Dark));
        assert!(cache.wait(Duration::from_secs(10)));

        cache.request(catalog, style(Theme::Light));
        cache.cancel();

        assert!(!cache.is_pending());
        assert!(!cache.poll());
        assert_eq!(cache.current().unwrap().theme(), Theme::Dark);
    }
}
