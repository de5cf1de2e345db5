//! Flurry Core - Foundational types for the Flurry snowfall overlay
//!
//! This crate provides the types every other Flurry crate depends on:
//! - `Motif` - The closed set of snowflake artwork variants
//! - `Color` - RGBA color with CSS-style string parsing
//! - `SnowfallConfig` - Host configuration merged over defaults
//! - `ContentHash` - SHA-256 digests for pixel identity checks
//! - Error types and Result alias

mod config;
mod error;
mod hash;
mod types;

pub use config::{CacheConfig, PowerConfig, SnowfallConfig, MAX_LINE_WIDTH, MAX_PARTICLE_SIZE};
pub use error::{FlurryError, Result};
pub use hash::ContentHash;
pub use types::{Color, Motif};
