//! Flurry Render - Procedural snowflake artwork and sprite caching
//!
//! This crate provides the drawing side of the snowfall overlay:
//! - `DrawContext` / `Surface` - the host drawing contract
//! - `Raster` - a software surface over an RGBA image
//! - `SnowflakeGeometry` - deterministic vector construction of each motif
//! - `RenderCache` - memoized sprites keyed by motif, size, color and width
//! - `draw_all` - composites cached sprites at per-particle opacity

pub mod cache;
mod context;
pub mod dispatch;
pub mod geometry;
mod raster;

pub use cache::{canvas_size, quantize_size, MAX_SPRITE_SIDE, CacheStats, RenderCache, Sprite, SpriteKey};
pub use context::{DrawContext, StrokeStyle, Surface};
pub use dispatch::{draw_all, SpriteRequest};
pub use geometry::{GeometryProvider, MotifMetrics, SnowflakeGeometry};
pub use raster::Raster;
