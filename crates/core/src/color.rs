//! RGBA color used for emitter tints, the hot color and instance output.
//!
//! Components are plain `f32` in [0, 1] with no gamma handling: the external
//! renderer receives them verbatim as per-instance vertex color.

use crate::error::RayError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Straight (non-premultiplied) RGBA color.
///
/// Serializes as a hex string: `"#rrggbb"` when alpha is 1, otherwise
/// `"#rrggbbaa"`. The hex round-trip has 8-bit quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    /// Default emitter tint (magenta).
    pub const MAGENTA: Rgba = Rgba::new(1.0, 0.2, 1.0, 1.0);
    /// Default "hot" color for field-based tinting (cyan glow).
    pub const CYAN_GLOW: Rgba = Rgba::new(0.2, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from three components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Linear interpolation of all four components. `t` is not clamped.
    pub fn lerp(self, to: Rgba, t: f32) -> Rgba {
        Rgba {
            r: self.r * (1.0 - t) + to.r * t,
            g: self.g * (1.0 - t) + to.g * t,
            b: self.b * (1.0 - t) + to.b * t,
            a: self.a * (1.0 - t) + to.a * t,
        }
    }

    /// Same color with alpha replaced.
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { a, ..self }
    }

    /// Components as an array, in `[r, g, b, a]` order.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `"#rrggbb"`, `"#rrggbbaa"` (the `#` is optional, case insensitive).
    ///
    /// Returns `RayError::InvalidColor` for any other shape.
    pub fn from_hex(hex: &str) -> Result<Rgba, RayError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 && hex.len() != 8 {
            return Err(RayError::InvalidColor(format!(
                "expected 6 or 8 hex digits, got {}",
                hex.len()
            )));
        }
        if !hex.is_ascii() {
            return Err(RayError::InvalidColor(format!("non-ascii color '{hex}'")));
        }
        let component = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|e| RayError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        let r = component(0..2, "red")?;
        let g = component(2..4, "green")?;
        let b = component(4..6, "blue")?;
        let a = if hex.len() == 8 {
            component(6..8, "alpha")?
        } else {
            1.0
        };
        Ok(Rgba { r, g, b, a })
    }

    /// Hex string, quantized to 8 bits per channel with rounding.
    pub fn to_hex(self) -> String {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (q(self.r), q(self.g), q(self.b), q(self.a));
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
