//! Drawing context contract between the core and a host surface

use flurry_core::Color;
use image::RgbaImage;

/// Stroke parameters shared by every branch of a motif.
///
/// Strokes are always drawn with round caps and round joins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    /// Width in the units of the current transform
    pub line_width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            line_width: 1.0,
        }
    }
}

/// Immediate-mode 2D drawing context, modelled on the HTML canvas API.
///
/// Path coordinates are mapped through the current transform when they are
/// added; stroke widths are scaled by the transform in effect at `stroke()`.
pub trait DrawContext {
    /// Push transform, alpha and paint state
    fn save(&mut self);
    /// Pop the state pushed by the matching `save()`; unbalanced calls are ignored
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, sx: f32, sy: f32);

    fn global_alpha(&self) -> f32;
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_stroke_style(&mut self, style: &StrokeStyle);
    fn set_fill_color(&mut self, color: Color);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    /// Clockwise arc; joins the current point to the arc start when a subpath is open
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32);
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill(&mut self);

    /// Reset every pixel to fully transparent
    fn clear(&mut self);
    /// Composite `image` with its top-left corner at `(x, y)` using the global alpha
    fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32);
}

/// A drawing context with known pixel dimensions, owned by the simulation loop
pub trait Surface: DrawContext {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Resize the backing store. Contents and context state are reset.
    fn resize(&mut self, width: u32, height: u32);
    /// Rasterize pending drawing into the backing store
    fn flush(&mut self) {}
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// One recorded context call
    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Save,
        Restore,
        Translate(f32, f32),
        Scale(f32, f32),
        Alpha(f32),
        StrokeStyle(StrokeStyle),
        FillColor(Color),
        BeginPath,
        MoveTo(f32, f32),
        LineTo(f32, f32),
        Arc(f32, f32, f32),
        ClosePath,
        Stroke,
        Fill,
        Clear,
        DrawImage { x: f32, y: f32, w: u32, h: u32, alpha: f32 },
    }

    /// Context that records calls instead of drawing
    #[derive(Default)]
    pub struct RecordingContext {
        pub ops: Vec<Op>,
        alpha_stack: Vec<f32>,
        alpha: Option<f32>,
    }

    impl RecordingContext {
        pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl DrawContext for RecordingContext {
        fn save(&mut self) {
            self.alpha_stack.push(self.global_alpha());
            self.ops.push(Op::Save);
        }
        fn restore(&mut self) {
            if let Some(a) = self.alpha_stack.pop() {
                self.alpha = Some(a);
            }
            self.ops.push(Op::Restore);
        }
        fn translate(&mut self, dx: f32, dy: f32) {
            self.ops.push(Op::Translate(dx, dy));
        }
        fn scale(&mut self, sx: f32, sy: f32) {
            self.ops.push(Op::Scale(sx, sy));
        }
        fn global_alpha(&self) -> f32 {
            self.alpha.unwrap_or(1.0)
        }
        fn set_global_alpha(&mut self, alpha: f32) {
            self.alpha = Some(alpha);
            self.ops.push(Op::Alpha(alpha));
        }
        fn set_stroke_style(&mut self, style: &StrokeStyle) {
            self.ops.push(Op::StrokeStyle(*style));
        }
        fn set_fill_color(&mut self, color: Color) {
            self.ops.push(Op::FillColor(color));
        }
        fn begin_path(&mut self) {
            self.ops.push(Op::BeginPath);
        }
        fn move_to(&mut self, x: f32, y: f32) {
            self.ops.push(Op::MoveTo(x, y));
        }
        fn line_to(&mut self, x: f32, y: f32) {
            self.ops.push(Op::LineTo(x, y));
        }
        fn arc(&mut self, cx: f32, cy: f32, radius: f32, _start: f32, _end: f32) {
            self.ops.push(Op::Arc(cx, cy, radius));
        }
        fn close_path(&mut self) {
            self.ops.push(Op::ClosePath);
        }
        fn stroke(&mut self) {
            self.ops.push(Op::Stroke);
        }
        fn fill(&mut self) {
            self.ops.push(Op::Fill);
        }
        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }
        fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32) {
            let alpha = self.global_alpha();
            self.ops.push(Op::DrawImage {
                x,
                y,
                w: image.width(),
                h: image.height(),
                alpha,
            });
        }
    }
}
