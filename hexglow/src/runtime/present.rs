//! Flattens the engine frame onto the theme background together with the
//! window chrome (the theme toggle button) into one opaque RGBA image, ready
//! to upload or save.

use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::input::Rect;
use crate::theme::Theme;

pub const TOGGLE_REGION: &str = "theme-toggle";

const BUTTON_SIZE: f32 = 36.0;
const BUTTON_MARGIN: f32 = 16.0;

/// Top-right corner square the toggle button occupies, in physical pixels
pub fn toggle_button_rect(width: u32, scale: f32) -> Rect {
    let size = BUTTON_SIZE * scale;
    let margin = BUTTON_MARGIN * scale;
    Rect::new(width as f32 - size - margin, margin, size, size)
}

fn ink(theme: Theme) -> [u8; 3] {
    match theme {
        Theme::Light => [40, 40, 48],
        Theme::Dark => [230, 230, 235],
    }
}

#[derive(Debug, Default)]
pub struct Presenter {
    canvas: Option<Pixmap>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas(&self) -> Option<&Pixmap> {
        self.canvas.as_ref()
    }

    /// Straight-alpha RGBA bytes of the last composed image. The canvas is
    /// opaque so premultiplied and straight alpha agree.
    pub fn rgba(&self) -> Option<&[u8]> {
        self.canvas.as_ref().map(|canvas| canvas.data())
    }

    pub fn compose(
        &mut self,
        width: u32,
        height: u32,
        theme: Theme,
        frame: Option<&Pixmap>,
        button: Option<(Rect, bool)>,
    ) -> Option<&Pixmap> {
        let reuse = self
            .canvas
            .as_ref()
            .is_some_and(|c| c.width() == width && c.height() == height);
        if !reuse {
            self.canvas = Pixmap::new(width, height);
        }
        let canvas = self.canvas.as_mut()?;

        let [r, g, b] = theme.background();
        canvas.fill(Color::from_rgba8(r, g, b, 255));

        if let Some(frame) = frame {
            canvas.draw_pixmap(
                0,
                0,
                frame.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        if let Some((rect, hovered)) = button {
            draw_toggle_button(canvas, rect, theme, hovered);
        }

        self.canvas.as_ref()
    }
}

/// A ring holding a sun in the dark theme and a crescent in the light one,
/// i.e. the theme a click switches to.
fn draw_toggle_button(
    canvas: &mut Pixmap,
    rect: Rect,
    theme: Theme,
    hovered: bool,
) {
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    let radius = rect.width.min(rect.height) / 2.0;
    let [r, g, b] = ink(theme);

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color_rgba8(r, g, b, if hovered { 200 } else { 110 });

    if let Some(ring) = PathBuilder::from_circle(cx, cy, radius - 1.0) {
        let stroke = Stroke {
            width: 1.5,
            ..Stroke::default()
        };
        canvas.stroke_path(
            &ring,
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
    }

    paint.set_color_rgba8(r, g, b, 230);
    let body = radius * 0.42;
    match theme {
        Theme::Dark => {
            if let Some(sun) = PathBuilder::from_circle(cx, cy, body * 0.7) {
                canvas.fill_path(
                    &sun,
                    &paint,
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            let mut rays = PathBuilder::new();
            for i in 0..8 {
                let angle = (i as f32 * 45.0).to_radians();
                let (sin, cos) = angle.sin_cos();
                rays.move_to(cx + cos * body * 1.05, cy + sin * body * 1.05);
                rays.line_to(cx + cos * body * 1.45, cy + sin * body * 1.45);
            }
            if let Some(rays) = rays.finish() {
                let stroke = Stroke {
                    width: 1.5,
                    ..Stroke::default()
                };
                canvas.stroke_path(
                    &rays,
                    &paint,
                    &stroke,
                    Transform::identity(),
                    None,
                );
            }
        }
        Theme::Light => {
            let mut moon = PathBuilder::new();
            moon.push_circle(cx, cy, body);
            moon.push_circle(cx + body * 0.55, cy - body * 0.35, body * 0.85);
            if let Some(moon) = moon.finish() {
                canvas.fill_path(
                    &moon,
                    &paint,
                    FillRule::EvenOdd,
                    Transform::identity(),
                    None,
                );
            }
        }
    }
}
