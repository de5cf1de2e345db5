//! Color and motif types

use crate::error::{FlurryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Snowflake artwork variant. Each particle carries one for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motif {
    /// Six plain branches with inner, long middle and short outer sub-branches
    #[serde(alias = "style1")]
    Fern,
    /// Six branches with three evenly angled sub-branch pairs
    #[serde(alias = "style2")]
    Lattice,
    /// Star-shaped core with disc ornaments on every branch tip
    #[serde(alias = "style3")]
    Star,
}

impl Motif {
    pub const ALL: [Motif; 3] = [Motif::Fern, Motif::Lattice, Motif::Star];

    pub fn name(&self) -> &'static str {
        match self {
            Motif::Fern => "fern",
            Motif::Lattice => "lattice",
            Motif::Star => "star",
        }
    }
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Motif {
    type Err = FlurryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fern" | "style1" => Ok(Motif::Fern),
            "lattice" | "style2" => Ok(Motif::Lattice),
            "star" | "style3" => Ok(Motif::Star),
            other => Err(FlurryError::UnknownMotif(other.to_string())),
        }
    }
}

/// RGBA color, components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            r: rgba[0] as f32 / 255.0,
            g: rgba[1] as f32 / 255.0,
            b: rgba[2] as f32 / 255.0,
            a: rgba[3] as f32 / 255.0,
        }
    }

    /// Quantize to 8 bits per channel
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Parse a CSS-style color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`,
    /// `rgba(..)` or one of a handful of names.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || FlurryError::InvalidColor(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(body).ok_or_else(invalid);
        }

        match lower.as_str() {
            "white" => Ok(Self::WHITE),
            "black" => Ok(Self::BLACK),
            "transparent" => Ok(Self::TRANSPARENT),
            "silver" => Ok(Self::from_hex(0xC0C0C0)),
            "gray" | "grey" => Ok(Self::from_hex(0x808080)),
            "lightblue" => Ok(Self::from_hex(0xADD8E6)),
            _ => Err(invalid()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let rgba = match hex.len() {
        3 => [nibble(0)?, nibble(1)?, nibble(2)?, 255],
        4 => [nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?],
        6 => [byte(0)?, byte(2)?, byte(4)?, 255],
        8 => [byte(0)?, byte(2)?, byte(4)?, byte(6)?],
        _ => return None,
    };
    Some(Color::from_rgba8(rgba))
}

fn parse_functional(body: &str) -> Option<Color> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<f32> {
        let v: f32 = p.parse().ok()?;
        (0.0..=255.0).contains(&v).then_some(v / 255.0)
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            let a: f32 = p.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            a
        }
        None => 1.0,
    };
    Some(Color::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl FromStr for Color {
    type Err = FlurryError;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = FlurryError;

    fn try_from(s: String) -> Result<Self> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFF8844);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
        assert!((c.b - 0.267).abs() < 0.01);
    }

    #[test]
    fn test_short_and_long_hex_agree() {
        let short = Color::parse("#fff").unwrap();
        let long = Color::parse("#FFFFFF").unwrap();
        assert_eq!(short.to_rgba8(), long.to_rgba8());
        assert_eq!(short.to_rgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_functional_notation() {
        let c = Color::parse("rgba(255, 0, 128, 0.5)").unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 128, 128]);
        let c = Color::parse("rgb(10,20,30)").unwrap();
        assert_eq!(c.to_rgba8(), [10, 20, 30, 255]);
    }

    #[test]
    fn test_invalid_colors_rejected() {
        assert!(Color::parse("#ggg").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("rgb(300, 0, 0)").is_err());
        assert!(Color::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        let c = Color::parse("#a0b0c0").unwrap();
        assert_eq!(c.to_string(), "#a0b0c0");
        let translucent = Color::parse("#a0b0c080").unwrap();
        assert_eq!(translucent.to_string(), "#a0b0c080");
    }

    #[test]
    fn test_motif_aliases() {
        assert_eq!("style1".parse::<Motif>().unwrap(), Motif::Fern);
        assert_eq!("Lattice".parse::<Motif>().unwrap(), Motif::Lattice);
        assert_eq!("style3".parse::<Motif>().unwrap(), Motif::Star);
        assert!("style4".parse::<Motif>().is_err());
    }
}
