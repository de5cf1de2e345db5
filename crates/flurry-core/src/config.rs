//! Host-supplied snowfall configuration, merged over defaults

use crate::error::{FlurryError, Result};
use crate::types::{Color, Motif};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted particle size
pub const MAX_PARTICLE_SIZE: f32 = 500.0;
/// Largest accepted stroke width
pub const MAX_LINE_WIDTH: f32 = 100.0;

/// Render cache limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry count above which a maintenance pass evicts the oldest half
    pub max_entries: usize,
    /// Seconds between time-driven maintenance passes
    pub maintenance_interval_secs: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50,
            maintenance_interval_secs: 30.0,
        }
    }
}

/// Battery-driven particle count degradation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Battery fraction at or below which a discharging device is "low"
    pub low_battery_threshold: f32,
    /// Particle count used while low
    pub low_power_count: usize,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            low_battery_threshold: 0.2,
            low_power_count: 20,
        }
    }
}

/// Snowfall configuration.
///
/// Every field has a default, so a host TOML document only needs the keys it
/// wants to override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowfallConfig {
    pub count: usize,
    pub size_range: [f32; 2],
    pub speed_range: [f32; 2],
    /// Horizontal drift per tick, sampled once per particle
    pub drift_range: [f32; 2],
    pub color: Color,
    /// Maximum particle opacity; each particle draws from `[0, opacity)`
    pub opacity: f32,
    /// Branch stroke width in motif units
    pub line_width: f32,
    pub shapes: Vec<Motif>,
    pub target_fps: f32,
    /// Round sizes to whole pixels so more particles share cache entries
    pub round_sizes: bool,
    /// Fixed RNG seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub cache: CacheConfig,
    pub power: PowerConfig,
}

impl Default for SnowfallConfig {
    fn default() -> Self {
        Self {
            count: 100,
            size_range: [8.0, 16.0],
            speed_range: [1.0, 2.0],
            drift_range: [-0.25, 0.25],
            color: Color::WHITE,
            opacity: 0.8,
            line_width: 12.0,
            shapes: Motif::ALL.to_vec(),
            target_fps: 45.0,
            round_sizes: true,
            seed: None,
            cache: CacheConfig::default(),
            power: PowerConfig::default(),
        }
    }
}

impl SnowfallConfig {
    /// Parse a TOML document, filling absent keys from defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        Ok(config)
    }

    /// Load and parse a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Minimum milliseconds between simulation ticks
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps as f64
    }

    /// Check that every field is inside its documented domain
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(invalid("count must be greater than 0"));
        }
        check_range("size_range", self.size_range)?;
        check_range("speed_range", self.speed_range)?;
        check_range("drift_range", self.drift_range)?;
        if self.size_range[0] <= 0.0 {
            return Err(invalid("size_range must be positive"));
        }
        if self.size_range[1] > MAX_PARTICLE_SIZE {
            return Err(invalid(format!(
                "size_range must not exceed {}, got {}",
                MAX_PARTICLE_SIZE, self.size_range[1]
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid(format!(
                "opacity must be between 0 and 1, got {}",
                self.opacity
            )));
        }
        if !(self.line_width > 0.0 && self.line_width <= MAX_LINE_WIDTH) {
            return Err(invalid(format!(
                "line_width must be in (0, {}], got {}",
                MAX_LINE_WIDTH,
                self.line_width
            )));
        }
        if self.shapes.is_empty() {
            return Err(invalid("shapes must name at least one motif"));
        }
        if !(self.target_fps > 0.0 && self.target_fps.is_finite()) {
            return Err(invalid(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        if self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries must be greater than 0"));
        }
        if !(self.cache.maintenance_interval_secs > 0.0) {
            return Err(invalid("cache.maintenance_interval_secs must be positive"));
        }
        if !(0.0..=1.0).contains(&self.power.low_battery_threshold) {
            return Err(invalid("power.low_battery_threshold must be between 0 and 1"));
        }
        if self.power.low_power_count == 0 {
            return Err(invalid("power.low_power_count must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> FlurryError {
    FlurryError::InvalidConfig(msg.into())
}

fn check_range(name: &str, [min, max]: [f32; 2]) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(invalid(format!("{} must be finite", name)));
    }
    if min > max {
        return Err(invalid(format!(
            "{} is inverted: [{}, {}]",
            name, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SnowfallConfig::default();
        config.validate().unwrap();
        assert_eq!(config.count, 100);
        assert_eq!(config.shapes.len(), 3);
        assert!((config.frame_interval_ms() - 1000.0 / 45.0).abs() < 1e-9);
    }

    #[test]
    fn partial_toml_merges_over_defaults() {
        let toml_str = r##"
count = 40
color = "#a0c8ff"
shapes = ["style1", "star"]
size_range = [4, 6]

[cache]
max_entries = 10
"##;
        let config = SnowfallConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.count, 40);
        assert_eq!(config.shapes, vec![Motif::Fern, Motif::Star]);
        assert_eq!(config.size_range, [4.0, 6.0]);
        assert_eq!(config.color.to_rgba8(), [0xa0, 0xc8, 0xff, 255]);
        assert_eq!(config.cache.max_entries, 10);
        // Untouched keys keep their defaults
        assert!((config.cache.maintenance_interval_secs - 30.0).abs() < 1e-9);
        assert!((config.opacity - 0.8).abs() < 1e-6);
        assert_eq!(config.power, PowerConfig::default());
    }

    #[test]
    fn bad_color_fails_to_parse() {
        let err = SnowfallConfig::from_toml_str("color = \"#zzz\"").unwrap_err();
        assert!(matches!(err, FlurryError::TomlParseError(_)));
    }

    #[test]
    fn validate_rejects_out_of_domain_values() {
        let mut config = SnowfallConfig::default();
        config.count = 0;
        assert!(config.validate().is_err());

        let mut config = SnowfallConfig::default();
        config.opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = SnowfallConfig::default();
        config.speed_range = [3.0, 1.0];
        assert!(config.validate().is_err());

        let mut config = SnowfallConfig::default();
        config.shapes.clear();
        assert!(config.validate().is_err());

        let mut config = SnowfallConfig::default();
        config.line_width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_sprite_dimensions() {
        let mut config = SnowfallConfig::default();
        config.count = 1;
        config.size_range = [1e9, 1e9];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, FlurryError::InvalidConfig(_)));

        config.size_range = [MAX_PARTICLE_SIZE, MAX_PARTICLE_SIZE];
        assert!(config.validate().is_ok());

        config.line_width = MAX_LINE_WIDTH * 2.0;
        assert!(config.validate().is_err());
        config.line_width = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let mut config = SnowfallConfig::default();
        config.seed = Some(7);
        config.color = Color::parse("#336699").unwrap();
        let text = config.to_toml_string().unwrap();
        let parsed = SnowfallConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.count, config.count);
        assert_eq!(parsed.color.to_rgba8(), config.color.to_rgba8());
        assert_eq!(parsed.shapes, config.shapes);
    }
}
