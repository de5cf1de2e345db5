//! Composites cached sprites onto the live surface

use crate::cache::RenderCache;
use crate::context::{DrawContext, StrokeStyle};
use crate::geometry::GeometryProvider;
use flurry_core::Motif;

/// Per-particle draw parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteRequest {
    pub motif: Motif,
    pub size: f32,
    /// Sprite center in surface coordinates
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
}

/// Draw every request in iteration order, each centered on its position
/// with the context's global alpha set to its opacity. The previous alpha
/// is restored after each composite. Returns the number of sprites drawn.
pub fn draw_all<C, I>(
    ctx: &mut C,
    cache: &mut RenderCache,
    provider: &dyn GeometryProvider,
    requests: I,
    style: &StrokeStyle,
    now_ms: f64,
) -> usize
where
    C: DrawContext + ?Sized,
    I: IntoIterator<Item = SpriteRequest>,
{
    let mut drawn = 0;
    for req in requests {
        let sprite = cache.get_or_build(
            provider,
            req.motif,
            req.size,
            style.color,
            style.line_width,
            now_ms,
        );

        let previous = ctx.global_alpha();
        ctx.set_global_alpha(req.opacity);
        ctx.draw_image(
            sprite.image(),
            req.x - sprite.width() as f32 / 2.0,
            req.y - sprite.height() as f32 / 2.0,
        );
        ctx.set_global_alpha(previous);
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::recording::{Op, RecordingContext};
    use crate::context::Surface;
    use crate::geometry::SnowflakeGeometry;
    use crate::raster::Raster;
    use flurry_core::{CacheConfig, Color};

    fn style() -> StrokeStyle {
        StrokeStyle {
            color: Color::WHITE,
            line_width: 12.0,
        }
    }

    fn request(motif: Motif, x: f32, y: f32, opacity: f32) -> SpriteRequest {
        SpriteRequest {
            motif,
            size: 10.0,
            x,
            y,
            opacity,
        }
    }

    #[test]
    fn composites_in_order_with_per_particle_alpha() {
        let mut ctx = RecordingContext::default();
        let mut cache = RenderCache::new(CacheConfig::default());
        let requests = [
            request(Motif::Fern, 10.0, 10.0, 0.3),
            request(Motif::Star, 50.0, 20.0, 0.7),
        ];
        let drawn = draw_all(&mut ctx, &mut cache, &SnowflakeGeometry, requests, &style(), 0.0);
        assert_eq!(drawn, 2);

        let draws: Vec<_> = ctx
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::DrawImage { x, y, w, h, alpha } => Some((*x, *y, *w, *h, *alpha)),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 2);

        let (x, y, w, h, alpha) = draws[0];
        assert!((x + w as f32 / 2.0 - 10.0).abs() < 1e-4);
        assert!((y + h as f32 / 2.0 - 10.0).abs() < 1e-4);
        assert!((alpha - 0.3).abs() < 1e-6);
        assert!((draws[1].4 - 0.7).abs() < 1e-6);
    }

    #[test]
    fn restores_previous_alpha() {
        let mut ctx = RecordingContext::default();
        ctx.set_global_alpha(0.9);
        let mut cache = RenderCache::new(CacheConfig::default());
        draw_all(
            &mut ctx,
            &mut cache,
            &SnowflakeGeometry,
            [request(Motif::Lattice, 0.0, 0.0, 0.2)],
            &style(),
            0.0,
        );
        assert!((ctx.global_alpha() - 0.9).abs() < 1e-6);
        assert_eq!(ctx.ops.last(), Some(&Op::Alpha(0.9)));
    }

    #[test]
    fn shared_parameters_share_one_sprite() {
        let mut surface = Raster::new(64, 64);
        let mut cache = RenderCache::new(CacheConfig::default());
        let requests = (0..10).map(|i| request(Motif::Fern, i as f32 * 6.0, 32.0, 1.0));
        draw_all(&mut surface, &mut cache, &SnowflakeGeometry, requests, &style(), 0.0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 9);
    }

    #[test]
    fn opacity_scales_composited_alpha() {
        let mut cache = RenderCache::new(CacheConfig::default());
        let mut opaque = Raster::new(64, 64);
        let mut faint = Raster::new(64, 64);
        let g = SnowflakeGeometry;
        draw_all(&mut opaque, &mut cache, &g, [request(Motif::Fern, 32.0, 32.0, 1.0)], &style(), 0.0);
        draw_all(&mut faint, &mut cache, &g, [request(Motif::Fern, 32.0, 32.0, 0.5)], &style(), 0.0);

        opaque.flush();
        faint.flush();

        assert_eq!(opaque.pixel(32, 32)[3], 255);
        let faint_alpha = faint.pixel(32, 32)[3];
        assert!((127..=128).contains(&faint_alpha), "alpha {faint_alpha}");
        assert_eq!(cache.len(), 1);
    }
}
