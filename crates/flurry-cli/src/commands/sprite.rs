//! Render one cached motif sprite to a PNG

use super::load_config;
use anyhow::{Context, Result};
use flurry_core::{Motif, MAX_PARTICLE_SIZE};
use flurry_render::{RenderCache, SnowflakeGeometry};

pub struct SpriteArgs {
    pub motif: String,
    pub size: f32,
    pub out: String,
    pub config: Option<String>,
}

pub fn run(args: SpriteArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    config.validate().context("Configuration is invalid")?;
    let motif: Motif = args.motif.parse().context("Invalid --motif")?;
    if !(args.size > 0.0 && args.size <= MAX_PARTICLE_SIZE) {
        anyhow::bail!(
            "--size must be in (0, {}], got {}",
            MAX_PARTICLE_SIZE,
            args.size
        );
    }

    let mut cache = RenderCache::new(config.cache.clone());
    let sprite = cache.get_or_build(
        &SnowflakeGeometry,
        motif,
        args.size,
        config.color,
        config.line_width,
        0.0,
    );
    sprite
        .save_png(&args.out)
        .with_context(|| format!("Failed to write '{}'", args.out))?;

    println!(
        "Wrote {} ({}x{}, {} at size {:.1}, {})",
        args.out,
        sprite.width(),
        sprite.height(),
        motif,
        sprite.key().size(),
        sprite.content_hash()
    );
    Ok(())
}
