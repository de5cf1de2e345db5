//! CLI command implementations

pub mod config;
pub mod render;
pub mod sprite;

use anyhow::{Context, Result};
use flurry_core::SnowfallConfig;

/// Load the config file if one was given, otherwise use defaults
pub fn load_config(path: Option<&str>) -> Result<SnowfallConfig> {
    match path {
        Some(path) => SnowfallConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path)),
        None => Ok(SnowfallConfig::default()),
    }
}
