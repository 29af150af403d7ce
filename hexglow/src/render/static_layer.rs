use tiny_skia::{BlendMode, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::draw_glyph;
use crate::glyph::GlyphSet;
use crate::lattice::Lattice;

/// Corners of a pointy-top hexagon, clockwise from the upper right
pub fn hexagon_vertices(x: f32, y: f32, radius: f32) -> [(f32, f32); 6] {
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f32 - 30.0).to_radians();
        (x + radius * angle.cos(), y + radius * angle.sin())
    })
}

/// Draws every cell's outline and dim doodle into a new viewport-sized
/// pixmap. Returns `None` for an empty viewport.
///
/// The result only changes with the lattice or the glyph set, so callers
/// keep it until one of them is rebuilt.
pub fn render_static_layer(
    lattice: &Lattice,
    glyphs: Option<&GlyphSet>,
    grid_color: [u8; 4],
    icon_size: f32,
) -> Option<Pixmap> {
    let width = lattice.width().ceil().max(0.0) as u32;
    let height = lattice.height().ceil().max(0.0) as u32;
    let mut pixmap = Pixmap::new(width, height)?;

    let mut builder = PathBuilder::new();
    for cell in lattice.cells() {
        let [first, rest @ ..] =
            hexagon_vertices(cell.x, cell.y, lattice.radius());
        builder.move_to(first.0, first.1);
        for (x, y) in rest {
            builder.line_to(x, y);
        }
        builder.close();
    }

    if let Some(outlines) = builder.finish() {
        let [r, g, b, a] = grid_color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(
            &outlines,
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
    }

    let Some(glyphs) = glyphs else {
        return Some(pixmap);
    };

    for cell in lattice.cells() {
        let Some(image) =
            glyphs.get(cell.glyph_index).and_then(|asset| asset.base())
        else {
            continue;
        };
        draw_glyph(
            &mut pixmap,
            image,
            glyphs.raster_size(),
            (cell.x, cell.y),
            icon_size,
            1.0,
            BlendMode::SourceOver,
        );
    }

    Some(pixmap)
}
