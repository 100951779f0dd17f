//! Colors shared by the scene renderer and the terminal palette.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PhaseKind;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba { rgb: self, alpha }
    }

    /// Composite `self` at `alpha` over `base`.
    #[must_use]
    pub fn blend_over(self, base: Rgb, alpha: f32) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f32::from(fg) * alpha + f32::from(bg) * (1.0 - alpha)).round() as u8
        };
        Rgb::new(mix(self.r, base.r), mix(self.g, base.g), mix(self.b, base.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color with straight (non-premultiplied) alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        rgb: Rgb::new(0, 0, 0),
        alpha: 0.0,
    };

    /// Linear interpolation in straight-alpha space.
    #[must_use]
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
        };
        Rgba {
            rgb: Rgb::new(
                channel(self.rgb.r, other.rgb.r),
                channel(self.rgb.g, other.rgb.g),
                channel(self.rgb.b, other.rgb.b),
            ),
            alpha: self.alpha + (other.alpha - self.alpha) * t,
        }
    }
}

/// Accent color of each phase, in phase order.
pub const PHASE_COLORS: [Rgb; 4] = [
    Rgb::from_hex(0xf9_73_16),
    Rgb::from_hex(0xfb_bf_24),
    Rgb::from_hex(0x38_bd_f8),
    Rgb::from_hex(0x22_c5_5e),
];

/// Neutral color used for the untraced box outline and inactive corners.
pub const OUTLINE_COLOR: Rgb = Rgb::from_hex(0xfd_e6_8a);

#[must_use]
pub const fn phase_color(kind: PhaseKind) -> Rgb {
    PHASE_COLORS[kind.index()]
}
