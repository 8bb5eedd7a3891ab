//! Theme palettes and dot field tuning
//!
//! A theme is a read-only parameter set: the three feedback colors, the
//! dot field falloff constants, and where dots take their color from.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Built-in theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemePreset {
    #[default]
    Classic,
    Severance,
    Forest,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 3] = [
        ThemePreset::Classic,
        ThemePreset::Severance,
        ThemePreset::Forest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreset::Classic => "classic",
            ThemePreset::Severance => "severance",
            ThemePreset::Forest => "forest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(ThemePreset::Classic),
            "severance" => Some(ThemePreset::Severance),
            "forest" => Some(ThemePreset::Forest),
            _ => None,
        }
    }

    /// Full parameter set for this preset
    pub fn theme(&self) -> Theme {
        match self {
            ThemePreset::Classic => Theme {
                palette: Palette {
                    base: Rgb::new(102, 194, 255),
                    target: Rgb::new(255, 92, 52),
                    hazard: Rgb::new(53, 30, 40),
                },
                dot_color: DotColorSource::Custom(Rgb::new(215, 239, 255)),
                grid: DotGrid {
                    glyphs: DotGlyphs::Symbols,
                    font_size: 20.0,
                },
                dots: DotBehavior {
                    base_jitter_amount: 2.0,
                    ..DotBehavior::default()
                },
            },
            ThemePreset::Severance => Theme {
                palette: Palette {
                    base: Rgb::new(0, 139, 146),
                    target: Rgb::new(226, 250, 251),
                    hazard: Rgb::new(7, 48, 75),
                },
                dot_color: DotColorSource::Hazard,
                grid: DotGrid {
                    glyphs: DotGlyphs::Alphanumeric,
                    font_size: 14.0,
                },
                dots: DotBehavior {
                    base_jitter_amount: 2.5,
                    ..DotBehavior::default()
                },
            },
            ThemePreset::Forest => Theme {
                palette: Palette {
                    base: Rgb::new(52, 97, 69),
                    target: Rgb::new(255, 185, 80),
                    hazard: Rgb::new(50, 33, 22),
                },
                dot_color: DotColorSource::Background,
                grid: DotGrid {
                    glyphs: DotGlyphs::Symbols,
                    font_size: 10.0,
                },
                dots: DotBehavior {
                    push_radius: 200.0,
                    max_push_distance: 40.0,
                    scale_radius: 180.0,
                    max_scale: 1.3,
                    visibility_radius: 280.0,
                    full_visibility_radius: 120.0,
                    base_jitter_amount: 0.0,
                    danger_shake_amount: 10.0,
                    danger_shake_exponent: 1.2,
                    ..DotBehavior::default()
                },
            },
        }
    }
}

/// Background feedback colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Resting background
    pub base: Rgb,
    /// Background near an unrevealed target
    pub target: Rgb,
    /// Background near a hazard
    pub hazard: Rgb,
}

/// Where dots take their resting color from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotColorSource {
    /// A fixed color
    Custom(Rgb),
    /// The palette's hazard color
    Hazard,
    /// A lighter tone of the current background
    Background,
}

/// What each grid dot is drawn as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DotGlyphs {
    #[default]
    Circles,
    Symbols,
    Alphanumeric,
}

impl DotGlyphs {
    /// Character set a dot's glyph is drawn from (empty for circles)
    pub fn characters(&self) -> &'static [char] {
        match self {
            DotGlyphs::Circles => &[],
            DotGlyphs::Symbols => &['▲', '◆', '•', '✦', '★', '◊'],
            DotGlyphs::Alphanumeric => &[
                'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P',
                'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5',
                '6', '7', '8', '9',
            ],
        }
    }
}

/// Grid appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotGrid {
    pub glyphs: DotGlyphs,
    /// Glyph font size in pixels
    pub font_size: f32,
}

impl Default for DotGrid {
    fn default() -> Self {
        Self {
            glyphs: DotGlyphs::Circles,
            font_size: 16.0,
        }
    }
}

/// Dot field falloff constants (all distances in pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotBehavior {
    /// Dots closer than this are pushed away from the cursor
    pub push_radius: f32,
    /// Push distance at the cursor itself
    pub max_push_distance: f32,
    /// Scale falls off over max(scale_radius, visibility_radius)
    pub scale_radius: f32,
    /// Scale at the cursor itself
    pub max_scale: f32,
    /// Dots are invisible at or beyond this distance
    pub visibility_radius: f32,
    /// Dots are fully opaque closer than this
    pub full_visibility_radius: f32,
    /// Constant jitter amplitude
    pub base_jitter_amount: f32,
    /// Peak danger shake amplitude
    pub danger_shake_amount: f32,
    /// Curve of the danger shake (higher = steeper near the hazard)
    pub danger_shake_exponent: f32,
    /// Extra multiplier on the danger shake
    pub hazard_jitter_boost: f32,
    /// Hazard distance at which danger effects begin
    pub danger_zone: f32,
}

impl Default for DotBehavior {
    fn default() -> Self {
        Self {
            push_radius: 150.0,
            max_push_distance: 60.0,
            scale_radius: 150.0,
            max_scale: 1.5,
            visibility_radius: 250.0,
            full_visibility_radius: 100.0,
            base_jitter_amount: 0.0,
            danger_shake_amount: 20.0,
            danger_shake_exponent: 1.5,
            hazard_jitter_boost: 1.6,
            danger_zone: 200.0,
        }
    }
}

/// A complete theme parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub palette: Palette,
    pub dot_color: DotColorSource,
    #[serde(default)]
    pub grid: DotGrid,
    pub dots: DotBehavior,
}

impl Default for Theme {
    fn default() -> Self {
        ThemePreset::default().theme()
    }
}

impl Theme {
    /// Resting dot color given the current background
    pub fn dot_base_color(&self, background: Rgb) -> Rgb {
        match self.dot_color {
            DotColorSource::Custom(color) => color,
            DotColorSource::Hazard => self.palette.hazard,
            DotColorSource::Background => background.lighten(120),
        }
    }
}
