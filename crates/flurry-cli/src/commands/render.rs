//! Headless snowfall-to-PNG render command

use super::load_config;
use anyhow::{Context, Result};
use flurry_core::Color;
use flurry_render::{Raster, SnowflakeGeometry};
use flurry_runtime::{power_channel, FrameOutcome, HostEvent, Snowfall};
use std::path::Path;
use tracing::{debug, info};

/// Display refresh rate the host simulates
const HOST_HZ: f64 = 60.0;

pub struct RenderArgs {
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub fps: Option<f32>,
    pub out: String,
    pub config: Option<String>,
    pub count: Option<usize>,
    pub seed: Option<u64>,
    pub battery: Option<f32>,
    pub charging: bool,
    pub background: Option<String>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(fps) = args.fps {
        config.target_fps = fps;
    }
    if let Some(count) = args.count {
        config.count = count;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let background = args
        .background
        .as_deref()
        .map(Color::parse)
        .transpose()
        .context("Invalid --background")?;

    let out_dir = Path::new(&args.out);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory '{}'", args.out))?;

    let (feed, monitor) = power_channel();
    let mut snowfall = Snowfall::builder(config)
        .surface(Raster::new(args.width, args.height))
        .geometry(SnowflakeGeometry)
        .power_monitor(monitor)
        .build()
        .context("Failed to initialize snowfall")?;

    if let Some(level) = args.battery {
        feed.report(level, args.charging);
    }

    snowfall.start();
    info!(
        frames = args.frames,
        width = args.width,
        height = args.height,
        particles = snowfall.particle_count(),
        "rendering"
    );

    let frame_ms = 1000.0 / HOST_HZ;
    let mut written = 0u32;
    let mut callbacks = 0u64;
    while written < args.frames {
        let timestamp = callbacks as f64 * frame_ms;
        callbacks += 1;
        if snowfall.handle(HostEvent::Frame(timestamp)) != Some(FrameOutcome::Rendered) {
            continue;
        }
        let Some(surface) = snowfall.surface() else {
            break;
        };

        let path = out_dir.join(format!("frame_{:04}.png", written));
        match background {
            Some(color) => surface
                .flatten_onto(color)
                .save_with_format(&path, image::ImageFormat::Png)
                .with_context(|| format!("Failed to write '{}'", path.display()))?,
            None => surface
                .save_png(&path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?,
        }
        debug!(frame = written, timestamp, "frame written");
        written += 1;
    }

    let stats = snowfall.cache().stats();
    snowfall.destroy();

    println!(
        "Rendered {} frames from {} host callbacks into {}",
        written, callbacks, args.out
    );
    println!(
        "Sprite cache: {} hits, {} misses, {} evicted",
        stats.hits, stats.misses, stats.evictions
    );
    Ok(())
}
