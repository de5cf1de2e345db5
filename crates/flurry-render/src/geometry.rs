//! Procedural snowflake geometry
//!
//! Each motif is drawn centered on the origin in its own native frame, whose
//! nominal span is [`MotifMetrics::base_size`]. Callers scale the context by
//! `size / base_size` before tracing. All branch strokes of a motif go into a
//! single path with one `stroke()`, and the center plus tip ornaments into a
//! single path with one `fill()`.

use crate::context::{DrawContext, StrokeStyle};
use flurry_core::Motif;
use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, TAU};

/// Size information the render cache needs to allocate a sprite
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotifMetrics {
    /// Nominal span of the motif in native units
    pub base_size: f32,
    /// Furthest extent of any ornament from the center, before stroke width
    pub max_radius: f32,
}

/// Supplies motif artwork to the render cache
pub trait GeometryProvider {
    fn metrics(&self, motif: Motif) -> MotifMetrics;

    /// Trace `motif` into `ctx` at full opacity, centered on the origin
    fn trace(&self, ctx: &mut dyn DrawContext, motif: Motif, style: &StrokeStyle);
}

/// Sub-branch pair: starts `distance` along the main branch, extends
/// `length`, and leaves at `angle ± offset`.
#[derive(Clone, Copy, Debug)]
struct SubBranch {
    distance: f32,
    length: f32,
    offset: f32,
}

const fn sub(distance: f32, length: f32, offset: f32) -> SubBranch {
    SubBranch {
        distance,
        length,
        offset,
    }
}

#[derive(Clone, Copy, Debug)]
enum Ornament {
    Disc { radius: f32 },
    /// 12-point star alternating `outer * inner_ratio` and `outer`
    Star { outer: f32, inner_ratio: f32 },
}

#[derive(Clone, Copy, Debug)]
struct Shape {
    base_size: f32,
    center: Ornament,
    branches: u32,
    branch_length: f32,
    sub_branches: &'static [SubBranch],
    /// Disc radius placed at every branch tip
    tip_radius: Option<f32>,
}

impl Shape {
    fn metrics(&self) -> MotifMetrics {
        let center = match self.center {
            Ornament::Disc { radius } => radius,
            Ornament::Star { outer, .. } => outer,
        };
        let tips = self.branch_length + self.tip_radius.unwrap_or(0.0);
        MotifMetrics {
            base_size: self.base_size,
            max_radius: center.max(tips),
        }
    }
}

const FERN: Shape = Shape {
    base_size: 85.0,
    center: Ornament::Disc { radius: 12.0 },
    branches: 6,
    branch_length: 85.0,
    sub_branches: &[
        sub(20.0, 20.0, FRAC_PI_4),
        sub(45.0, 30.0, FRAC_PI_3),
        sub(70.0, 20.0, FRAC_PI_3),
    ],
    tip_radius: None,
};

const LATTICE: Shape = Shape {
    base_size: 85.0,
    center: Ornament::Disc { radius: 10.0 },
    branches: 6,
    branch_length: 85.0,
    sub_branches: &[
        sub(25.0, 12.0, FRAC_PI_3),
        sub(50.0, 18.0, FRAC_PI_3),
        sub(70.0, 18.0, FRAC_PI_3),
    ],
    tip_radius: None,
};

const STAR: Shape = Shape {
    base_size: 100.0,
    center: Ornament::Star {
        outer: 32.0,
        inner_ratio: 0.36,
    },
    branches: 6,
    branch_length: 95.0,
    sub_branches: &[
        sub(25.0, 16.0, FRAC_PI_4),
        sub(45.0, 28.0, FRAC_PI_4),
        sub(65.0, 16.0, FRAC_PI_4),
    ],
    tip_radius: Some(8.0),
};

fn shape(motif: Motif) -> &'static Shape {
    match motif {
        Motif::Fern => &FERN,
        Motif::Lattice => &LATTICE,
        Motif::Star => &STAR,
    }
}

/// The stock snowflake artwork
#[derive(Clone, Copy, Debug, Default)]
pub struct SnowflakeGeometry;

impl GeometryProvider for SnowflakeGeometry {
    fn metrics(&self, motif: Motif) -> MotifMetrics {
        shape(motif).metrics()
    }

    fn trace(&self, ctx: &mut dyn DrawContext, motif: Motif, style: &StrokeStyle) {
        match motif {
            Motif::Fern => trace_fern(ctx, style),
            Motif::Lattice => trace_lattice(ctx, style),
            Motif::Star => trace_star(ctx, style),
        }
    }
}

fn trace_fern(ctx: &mut dyn DrawContext, style: &StrokeStyle) {
    trace_shape(ctx, &FERN, style);
}

fn trace_lattice(ctx: &mut dyn DrawContext, style: &StrokeStyle) {
    trace_shape(ctx, &LATTICE, style);
}

fn trace_star(ctx: &mut dyn DrawContext, style: &StrokeStyle) {
    trace_shape(ctx, &STAR, style);
}

fn trace_shape(ctx: &mut dyn DrawContext, shape: &Shape, style: &StrokeStyle) {
    ctx.set_stroke_style(style);
    ctx.set_fill_color(style.color);

    // Fill pass: center ornament plus every tip ornament
    ctx.begin_path();
    match shape.center {
        Ornament::Disc { radius } => disc(ctx, 0.0, 0.0, radius),
        Ornament::Star { outer, inner_ratio } => star(ctx, outer, inner_ratio),
    }
    if let Some(radius) = shape.tip_radius {
        for angle in branch_angles(shape.branches) {
            let (sin, cos) = angle.sin_cos();
            disc(ctx, shape.branch_length * cos, shape.branch_length * sin, radius);
        }
    }
    ctx.fill();

    // Stroke pass: main branches and sub-branch pairs
    ctx.begin_path();
    for angle in branch_angles(shape.branches) {
        let (sin, cos) = angle.sin_cos();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(shape.branch_length * cos, shape.branch_length * sin);

        for sb in shape.sub_branches {
            let (bx, by) = (sb.distance * cos, sb.distance * sin);
            for side in [angle + sb.offset, angle - sb.offset] {
                let (s, c) = side.sin_cos();
                ctx.move_to(bx, by);
                ctx.line_to(bx + sb.length * c, by + sb.length * s);
            }
        }
    }
    ctx.stroke();
}

fn branch_angles(count: u32) -> impl Iterator<Item = f32> {
    (0..count).map(move |i| i as f32 * TAU / count as f32)
}

fn disc(ctx: &mut dyn DrawContext, cx: f32, cy: f32, radius: f32) {
    ctx.move_to(cx + radius, cy);
    ctx.arc(cx, cy, radius, 0.0, TAU);
    ctx.close_path();
}

fn star(ctx: &mut dyn DrawContext, outer: f32, inner_ratio: f32) {
    for i in 0..12 {
        let radius = if i % 2 == 1 { outer } else { outer * inner_ratio };
        let (sin, cos) = (i as f32 * TAU / 12.0).sin_cos();
        if i == 0 {
            ctx.move_to(radius * cos, radius * sin);
        } else {
            ctx.line_to(radius * cos, radius * sin);
        }
    }
    ctx.close_path();
}
