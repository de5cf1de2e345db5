//! Flurry CLI - Headless host for the Flurry snowfall overlay

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, render, sprite};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "flurry")]
#[command(about = "Procedural snowfall overlay rendered to PNG frames", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a 60 Hz host and write every rendered frame as a PNG
    Render {
        /// Number of rendered frames to write
        #[arg(long, default_value = "60")]
        frames: u32,

        /// Surface width in pixels
        #[arg(long, default_value = "640")]
        width: u32,

        /// Surface height in pixels
        #[arg(long, default_value = "360")]
        height: u32,

        /// Target simulation rate (overrides the config file)
        #[arg(long)]
        fps: Option<f32>,

        /// Output directory for frame_NNNN.png files
        #[arg(short, long, default_value = "frames")]
        out: String,

        /// Path to a snowfall TOML config
        #[arg(long)]
        config: Option<String>,

        /// Particle count (overrides the config file)
        #[arg(long)]
        count: Option<usize>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Report this battery level (0.0 - 1.0) to the power monitor
        #[arg(long, value_parser = parse_fraction)]
        battery: Option<f32>,

        /// Report the battery as charging
        #[arg(long, requires = "battery")]
        charging: bool,

        /// Flatten frames onto this color instead of keeping transparency
        #[arg(long)]
        background: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to a snowfall TOML config
        #[arg(long)]
        config: Option<String>,
    },

    /// Render a single cached motif sprite to a PNG
    Sprite {
        /// Motif name (fern, lattice, star)
        #[arg(long, default_value = "fern")]
        motif: String,

        /// Particle size the sprite is drawn at
        #[arg(long, default_value = "64")]
        size: f32,

        /// Output image path
        #[arg(short, long, default_value = "sprite.png")]
        out: String,

        /// Path to a snowfall TOML config (color and line width)
        #[arg(long)]
        config: Option<String>,
    },
}

fn parse_fraction(s: &str) -> Result<f32, String> {
    let value: f32 = s.trim().parse().map_err(|e| format!("invalid number: {}", e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("expected a value between 0 and 1, got {}", value))
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            frames,
            width,
            height,
            fps,
            out,
            config,
            count,
            seed,
            battery,
            charging,
            background,
        } => render::run(render::RenderArgs {
            frames,
            width,
            height,
            fps,
            out,
            config,
            count,
            seed,
            battery,
            charging,
            background,
        }),
        Commands::Config { config: path } => config::run(path.as_deref()),
        Commands::Sprite {
            motif,
            size,
            out,
            config,
        } => sprite::run(sprite::SpriteArgs {
            motif,
            size,
            out,
            config,
        }),
    }
}
