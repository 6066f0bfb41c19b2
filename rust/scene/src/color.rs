// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linear-space RGBA colors and the three-stop ramp used for metric
//! coloring (heatmap overlays driven by quantity or analysis values).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Linear-space RGBA color. Components are unclamped f32; renderers
/// receive them as-is via [`Rgba::to_array`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);

    /// Creates a color from all four components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    /// Returns the color as `[r, g, b, a]` for GPU-facing consumers.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Creates a color from `[r, g, b, a]`.
    #[inline]
    pub const fn from_array(c: [f32; 4]) -> Self {
        Rgba::new(c[0], c[1], c[2], c[3])
    }

    /// Component-wise linear interpolation, `t` clamped to `[0, 1]`.
    /// Endpoints are exact: `t <= 0` returns `self` and `t >= 1` returns
    /// `other` bitwise (the additive form rounds).
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Returns a copy with the alpha channel replaced.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { a, ..self }
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Rgba> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(Error::InvalidColor(hex.to_string()));
        }
        let byte = |range: std::ops::Range<usize>| -> Result<f32> {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| Error::InvalidColor(hex.to_string()))
        };
        let r = byte(0..2)?;
        let g = byte(2..4)?;
        let b = byte(4..6)?;
        let a = if digits.len() == 8 { byte(6..8)? } else { 1.0 };
        Ok(Rgba { r, g, b, a })
    }

    /// Formats the color as `#rrggbb` (alpha appended only when not 1).
    pub fn to_hex(self) -> String {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        if (self.a - 1.0).abs() < f32::EPSILON {
            format!("#{:02x}{:02x}{:02x}", to_byte(self.r), to_byte(self.g), to_byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                to_byte(self.r),
                to_byte(self.g),
                to_byte(self.b),
                to_byte(self.a)
            )
        }
    }
}

/// Three-stop piecewise-linear color ramp (low / mid / high).
///
/// Metric coloring normalizes each value against a caller-supplied range
/// and samples the ramp: `0.0` maps to `low`, `0.5` to `mid`, `1.0` to
/// `high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub low: Rgba,
    pub mid: Rgba,
    pub high: Rgba,
}

impl ColorRamp {
    /// Creates a ramp from its three stops.
    pub const fn new(low: Rgba, mid: Rgba, high: Rgba) -> Self {
        ColorRamp { low, mid, high }
    }

    /// Green → yellow → red, the conventional analysis heatmap.
    pub const fn heat() -> Self {
        ColorRamp {
            low: Rgba::rgb(0.18, 0.72, 0.21),
            mid: Rgba::rgb(0.95, 0.85, 0.12),
            high: Rgba::rgb(0.86, 0.16, 0.12),
        }
    }

    /// Samples the ramp at `t` (clamped to `[0, 1]`).
    pub fn sample(&self, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0) as f32;
        if t <= 0.5 {
            self.low.lerp(self.mid, t * 2.0)
        } else {
            self.mid.lerp(self.high, (t - 0.5) * 2.0)
        }
    }

    /// Normalizes `value` against `(min, max)` into ramp space.
    /// A degenerate range maps every value to the midpoint.
    pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
        if max <= min {
            return 0.5;
        }
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        ColorRamp::heat()
    }
}
