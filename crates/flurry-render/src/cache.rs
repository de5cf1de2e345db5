//! Sprite cache: memoized motif rasterization keyed by visual parameters

use crate::context::{DrawContext, StrokeStyle};
use crate::geometry::{GeometryProvider, MotifMetrics};
use crate::raster::{save_image, Raster};
use flurry_core::{CacheConfig, Color, ContentHash, Motif, Result};
use image::RgbaImage;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Normalize a particle size to tenths, truncating.
///
/// A small epsilon absorbs representation noise so `10.1` stays `101`.
pub fn quantize_size(size: f32) -> u32 {
    (size.max(0.0) * 10.0 + 1e-4).floor() as u32
}

/// Upper bound on a sprite's side length in pixels
pub const MAX_SPRITE_SIDE: u32 = 2048;

/// Side length in pixels of the square sprite that contains a motif drawn at
/// `size` with `line_width`, including a 10% safety margin. Clamped to
/// `1..=MAX_SPRITE_SIDE`.
pub fn canvas_size(metrics: MotifMetrics, size: f32, line_width: f32) -> u32 {
    let side = ((metrics.max_radius * (size / metrics.base_size) + line_width) * 2.0 * 1.1).ceil();
    side.clamp(1.0, MAX_SPRITE_SIDE as f32) as u32
}

/// Cache lookup key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    pub motif: Motif,
    pub size_tenths: u32,
    pub color: [u8; 4],
    pub line_width_bits: u32,
}

impl SpriteKey {
    pub fn new(motif: Motif, size: f32, color: Color, line_width: f32) -> Self {
        Self {
            motif,
            size_tenths: quantize_size(size),
            color: color.to_rgba8(),
            line_width_bits: line_width.to_bits(),
        }
    }

    /// The normalized size every sprite under this key is drawn at
    pub fn size(&self) -> f32 {
        self.size_tenths as f32 / 10.0
    }

    pub fn line_width(&self) -> f32 {
        f32::from_bits(self.line_width_bits)
    }
}

/// A prerendered, immutable motif image
pub struct Sprite {
    key: SpriteKey,
    image: RgbaImage,
}

impl Sprite {
    pub fn key(&self) -> &SpriteKey {
        &self.key
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Digest of the pixel data
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::from_bytes(self.image.as_raw())
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_image(&self.image, path)
    }
}

/// Lookup and eviction counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded sprite store with insertion-order eviction.
///
/// Eviction is by insertion order, not recency of use.
pub struct RenderCache {
    config: CacheConfig,
    entries: HashMap<SpriteKey, Arc<Sprite>>,
    /// Keys oldest-first
    order: VecDeque<SpriteKey>,
    last_maintenance_ms: Option<f64>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            order: VecDeque::new(),
            last_maintenance_ms: None,
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn contains(&self, key: &SpriteKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the sprite for these parameters, rasterizing it on a miss.
    ///
    /// Maintenance runs before the lookup, so the returned entry is never
    /// the one a pass just evicted.
    pub fn get_or_build(
        &mut self,
        provider: &dyn GeometryProvider,
        motif: Motif,
        size: f32,
        color: Color,
        line_width: f32,
        now_ms: f64,
    ) -> Arc<Sprite> {
        self.maintain(now_ms);

        let key = SpriteKey::new(motif, size, color, line_width);
        if let Some(sprite) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(sprite);
        }

        self.stats.misses += 1;
        let sprite = Arc::new(build_sprite(provider, key));
        self.entries.insert(key, Arc::clone(&sprite));
        self.order.push_back(key);
        sprite
    }

    /// Evict the oldest half when over capacity or when the maintenance
    /// interval has elapsed. Returns the number of entries evicted.
    ///
    /// The first call only starts the interval timer.
    pub fn maintain(&mut self, now_ms: f64) -> usize {
        let last = *self.last_maintenance_ms.get_or_insert(now_ms);
        let over_capacity = self.entries.len() > self.config.max_entries;
        let interval_ms = self.config.maintenance_interval_secs * 1000.0;
        let stale = now_ms - last > interval_ms;
        if !over_capacity && !stale {
            return 0;
        }

        let evicted = self.evict_oldest(self.entries.len() / 2);
        self.last_maintenance_ms = Some(now_ms);
        if evicted > 0 {
            debug!(
                evicted,
                remaining = self.entries.len(),
                over_capacity,
                "render cache maintenance"
            );
        }
        evicted
    }

    /// Drop every entry and restart the maintenance timer
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.last_maintenance_ms = None;
        if dropped > 0 {
            debug!(dropped, "render cache cleared");
        }
    }

    fn evict_oldest(&mut self, count: usize) -> usize {
        let mut evicted = 0;
        while evicted < count {
            let Some(key) = self.order.pop_front() else {
                break;
            };
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }
        self.stats.evictions += evicted as u64;
        evicted
    }
}

fn build_sprite(provider: &dyn GeometryProvider, key: SpriteKey) -> Sprite {
    let metrics = provider.metrics(key.motif);
    let size = key.size();
    let line_width = key.line_width();
    let side = canvas_size(metrics, size, line_width);

    let mut raster = Raster::new(side, side);
    let center = side as f32 / 2.0;
    let scale = size / metrics.base_size;
    raster.translate(center, center);
    raster.scale(scale, scale);
    raster.set_global_alpha(1.0);
    let style = StrokeStyle {
        color: Color::from_rgba8(key.color),
        line_width,
    };
    provider.trace(&mut raster, key.motif, &style);

    Sprite {
        key,
        image: raster.into_image(),
    }
}
