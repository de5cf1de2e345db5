//! Software raster surface backed by `vello_cpu`
//!
//! Used both for cache sprites and as the live surface of headless hosts.
//! Drawing calls are recorded into a `vello_cpu::RenderContext`; `flush()`
//! rasterizes everything drawn since the last `clear()` into the RGBA image.

use crate::context::{DrawContext, StrokeStyle, Surface};
use flurry_core::{Color, FlurryError, Result};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use vello_cpu::kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape, Stroke};
use vello_cpu::peniko::color::PremulRgba8;
use vello_cpu::peniko::{Fill, ImageQuality, ImageSampler};
use vello_cpu::{Pixmap, RenderContext};

/// Max deviation, in device pixels, when flattening arcs to curves
const ARC_TOLERANCE: f64 = 0.1;

#[derive(Clone, Copy)]
struct DrawState {
    transform: Affine,
    alpha: f32,
    stroke: StrokeStyle,
    fill: Color,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            stroke: StrokeStyle::default(),
            fill: Color::BLACK,
        }
    }
}

/// An RGBA pixel buffer implementing [`DrawContext`] and [`Surface`]
pub struct Raster {
    ctx: RenderContext,
    pixmap: Pixmap,
    image: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
    /// Current path in device space
    path: BezPath,
    subpath_start: Option<Point>,
    subpath_open: bool,
}

impl Raster {
    /// Create a fully transparent raster; each side is clamped to `1..=65535`
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (side(width), side(height));
        Self {
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
            image: RgbaImage::new(w as u32, h as u32),
            state: DrawState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            subpath_start: None,
            subpath_open: false,
        }
    }

    /// Pixels as of the last `flush()`
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(mut self) -> RgbaImage {
        self.flush();
        self.image
    }

    /// RGBA bytes of one pixel as of the last `flush()`
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Composite the raster over an opaque background color
    pub fn flatten_onto(&self, background: Color) -> RgbaImage {
        let bg = background.to_rgba8();
        let mut out = RgbaImage::from_pixel(self.image.width(), self.image.height(), Rgba(bg));
        for (dst, src) in out.pixels_mut().zip(self.image.pixels()) {
            let a = src[3] as u32;
            for i in 0..3 {
                dst[i] = ((src[i] as u32 * a + bg[i] as u32 * (255 - a) + 127) / 255) as u8;
            }
            dst[3] = 255;
        }
        out
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_image(&self.image, path)
    }

    /// Uniform scale factor of the current transform
    fn device_scale(&self) -> f64 {
        self.state.transform.determinant().abs().sqrt()
    }

    fn to_device(&self, x: f32, y: f32) -> Point {
        self.state.transform * Point::new(x as f64, y as f64)
    }

    fn push_line(&mut self, p: Point) {
        if !self.subpath_open {
            // A closed subpath resumes from its start point, as on a canvas
            let start = self.subpath_start.unwrap_or(p);
            self.path.move_to(start);
            self.subpath_start = Some(start);
            self.subpath_open = true;
        }
        self.path.line_to(p);
    }

    fn paint(&self, color: Color) -> vello_cpu::peniko::Color {
        let [r, g, b, a] = color.to_rgba8();
        let a = (a as f32 * self.state.alpha).round() as u8;
        vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
    }
}

fn side(n: u32) -> u16 {
    n.clamp(1, u16::MAX as u32) as u16
}

/// Straight-alpha image to a premultiplied pixmap
fn pixmap_from_image(image: &RgbaImage) -> Option<Pixmap> {
    let w = u16::try_from(image.width()).ok()?;
    let h = u16::try_from(image.height()).ok()?;
    let pixels = image
        .pixels()
        .map(|p| {
            let a = p[3] as u16;
            let premul = |c: u8| (((c as u16) * a + 127) / 255) as u8;
            PremulRgba8::from_u8_array([premul(p[0]), premul(p[1]), premul(p[2]), p[3]])
        })
        .collect();
    Some(Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

/// Premultiplied pixmap bytes back to straight alpha
fn unpremultiply_into(bytes: &[u8], image: &mut RgbaImage) {
    for (dst, px) in image.pixels_mut().zip(bytes.chunks_exact(4)) {
        let a = px[3] as u32;
        if a == 0 {
            *dst = Rgba([0, 0, 0, 0]);
            continue;
        }
        let straight = |c: u8| ((c as u32 * 255 + a / 2) / a).min(255) as u8;
        *dst = Rgba([straight(px[0]), straight(px[1]), straight(px[2]), px[3]]);
    }
}

pub(crate) fn save_image<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| FlurryError::ImageError(e.to_string()))
}

impl DrawContext for Raster {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform * Affine::translate((dx as f64, dy as f64));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform * Affine::scale_non_uniform(sx as f64, sy as f64);
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.state.stroke = *style;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.subpath_start = None;
        self.subpath_open = false;
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        self.path.move_to(p);
        self.subpath_start = Some(p);
        self.subpath_open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        self.push_line(p);
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32) {
        if !(radius > 0.0) {
            return;
        }
        let tau = std::f64::consts::TAU;
        let mut sweep = (end_angle - start_angle) as f64;
        if sweep < 0.0 {
            sweep = sweep.rem_euclid(tau);
        }
        let arc = vello_cpu::kurbo::Arc::new(
            (cx as f64, cy as f64),
            (radius as f64, radius as f64),
            start_angle as f64,
            sweep.min(tau),
            0.0,
        );
        let tolerance = ARC_TOLERANCE / self.device_scale().max(1e-6);
        let local: BezPath = arc.path_elements(tolerance).collect();
        let device = self.state.transform * local;

        for el in device.elements() {
            match *el {
                vello_cpu::kurbo::PathEl::MoveTo(p) => {
                    if self.subpath_open {
                        self.path.line_to(p);
                    } else {
                        self.path.move_to(p);
                        self.subpath_start = Some(p);
                        self.subpath_open = true;
                    }
                }
                vello_cpu::kurbo::PathEl::LineTo(p) => self.path.line_to(p),
                vello_cpu::kurbo::PathEl::QuadTo(p1, p2) => self.path.quad_to(p1, p2),
                vello_cpu::kurbo::PathEl::CurveTo(p1, p2, p3) => self.path.curve_to(p1, p2, p3),
                vello_cpu::kurbo::PathEl::ClosePath => {}
            }
        }
    }

    fn close_path(&mut self) {
        if self.subpath_open {
            self.path.close_path();
            self.subpath_open = false;
        }
    }

    fn stroke(&mut self) {
        let width = self.state.stroke.line_width as f64 * self.device_scale();
        if !(width > 0.0) || self.path.elements().is_empty() {
            return;
        }
        let paint = self.paint(self.state.stroke.color);
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.set_stroke(
            Stroke::new(width)
                .with_caps(Cap::Round)
                .with_join(Join::Round),
        );
        self.ctx.stroke_path(&self.path);
    }

    fn fill(&mut self) {
        if self.path.elements().is_empty() {
            return;
        }
        let paint = self.paint(self.state.fill);
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.set_fill_rule(Fill::NonZero);
        self.ctx.fill_path(&self.path);
    }

    fn clear(&mut self) {
        self.ctx.reset();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        for p in self.image.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32) {
        let alpha = self.state.alpha;
        if alpha <= 0.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(pixmap) = pixmap_from_image(image) else {
            return;
        };
        let origin = self.to_device(x, y);
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: ImageSampler::default().with_quality(ImageQuality::Low),
        };

        self.ctx
            .set_transform(Affine::translate((origin.x.round(), origin.y.round())));
        self.ctx.set_paint_transform(Affine::IDENTITY);
        self.ctx.set_paint(paint);
        if alpha < 1.0 {
            self.ctx.push_opacity_layer(alpha);
        }
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            image.width() as f64,
            image.height() as f64,
        ));
        if alpha < 1.0 {
            self.ctx.pop_layer();
        }
    }
}

impl Surface for Raster {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = Raster::new(width, height);
    }

    fn flush(&mut self) {
        self.ctx.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.pixmap);
        unpremultiply_into(self.pixmap.data_as_u8_slice(), &mut self.image);
    }
}
