use tiny_skia::{BlendMode, FilterQuality, Pixmap, PixmapPaint, Transform};

pub mod compositor;
pub mod static_layer;

pub use compositor::{Compositor, decay_active};
pub use static_layer::{hexagon_vertices, render_static_layer};

/// Draws a padded glyph image centered on `(cx, cy)` so its glyph area
/// (`raster_size` pixels before scaling) spans `size` pixels.
pub(crate) fn draw_glyph(
    canvas: &mut Pixmap,
    image: &Pixmap,
    raster_size: u32,
    (cx, cy): (f32, f32),
    size: f32,
    opacity: f32,
    blend_mode: BlendMode,
) {
    if raster_size == 0 || opacity <= 0.0 {
        return;
    }

    let scale = size / raster_size as f32;
    let half_w = image.width() as f32 * scale / 2.0;
    let half_h = image.height() as f32 * scale / 2.0;
    let transform = Transform::from_scale(scale, scale)
        .post_translate(cx - half_w, cy - half_h);

    let paint = PixmapPaint {
        opacity: opacity.min(1.0),
        blend_mode,
        quality: FilterQuality::Bilinear,
    };

    canvas.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
}
