//! RGB color values parsed from and printed as `#rrggbb` hex strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linear-blend friendly RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Move `t` of the way from `self` toward `target`.
    pub fn lerp(&self, target: Rgb, t: f32) -> Self {
        Self {
            r: self.r + (target.r - self.r) * t,
            g: self.g + (target.g - self.g) * t,
            b: self.b + (target.b - self.b) * t,
        }
    }

    pub fn lerp_toward(&mut self, target: Rgb, t: f32) {
        *self = self.lerp(target, t);
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| s.to_string())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse_and_format() {
        let c = Rgb::from_hex("#f0e8a0").unwrap();
        assert_eq!(c.to_hex(), "#f0e8a0");
        assert!(Rgb::from_hex("f0e8a0").is_some());
        assert!(Rgb::from_hex("#f0e8").is_none());
        assert!(Rgb::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_lerp_midpoint() {
        let black = Rgb::new(0.0, 0.0, 0.0);
        let mid = black.lerp(Rgb::WHITE, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(black.lerp(Rgb::WHITE, 0.0), black);
        assert_eq!(black.lerp(Rgb::WHITE, 1.0), Rgb::WHITE);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::from_hex("#3388cc").unwrap()).unwrap();
        assert_eq!(json, "\"#3388cc\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#3388cc");
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }
}
