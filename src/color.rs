//! RGB color helpers
//!
//! Colors are 8-bit per channel. Blending rounds each channel to the
//! nearest integer so that factor 0 and factor 1 hit the endpoints exactly.

use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward `other` by `factor` (clamped to 0..=1)
    pub fn lerp(self, other: Rgb, factor: f32) -> Rgb {
        let t = factor.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Add `amount` to every channel, saturating at 255
    pub fn lighten(self, amount: u8) -> Rgb {
        Rgb {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }

    /// Subtract `amount` from every channel, saturating at 0
    pub fn darken(self, amount: u8) -> Rgb {
        Rgb {
            r: self.r.saturating_sub(amount),
            g: self.g.saturating_sub(amount),
            b: self.b.saturating_sub(amount),
        }
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { rgb: self, a }
    }

    /// CSS `rgb(...)` string
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// RGB plus a fractional alpha, as handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    /// CSS `rgba(...)` string
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.a
        )
    }
}
