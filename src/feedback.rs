//! Proximity feedback
//!
//! Derives the ambient background from how close the cursor is to the
//! nearest live target and the nearest hazard, plus the cursor-side
//! indicator bars and the hot/cold hint.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::consts::*;
use crate::theme::Palette;
use crate::{closeness_percent, falloff};

/// Channel offset between the two gradient stops
pub const GRADIENT_DARKEN: u8 = 20;

/// Feedback distances (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTuning {
    /// Target color starts bleeding in below this distance
    pub target_distance: f32,
    /// Hazard color starts bleeding in below this distance
    pub hazard_distance: f32,
    /// Target bar is empty at this distance
    pub target_bar_distance: f32,
    /// Hazard bar is empty at this distance
    pub hazard_bar_distance: f32,
}

impl Default for FeedbackTuning {
    fn default() -> Self {
        Self {
            target_distance: TARGET_FEEDBACK_DISTANCE,
            hazard_distance: HAZARD_FEEDBACK_DISTANCE,
            target_bar_distance: TARGET_FEEDBACK_DISTANCE,
            hazard_bar_distance: HAZARD_FEEDBACK_DISTANCE,
        }
    }
}

/// Everything the presentation layer needs to paint feedback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    /// First gradient stop
    pub background: Rgb,
    /// Second gradient stop
    pub gradient_end: Rgb,
    /// Gradient direction in degrees
    pub gradient_angle: f32,
    /// Target closeness bar, 0-100
    pub target_percent: f32,
    /// Hazard closeness bar, 0-100
    pub hazard_percent: f32,
    pub hint: &'static str,
}

impl Feedback {
    /// Feedback with nothing nearby
    pub fn resting(palette: &Palette) -> Self {
        Self {
            background: palette.base,
            gradient_end: palette.base.darken(GRADIENT_DARKEN),
            gradient_angle: 0.0,
            target_percent: 0.0,
            hazard_percent: 0.0,
            hint: proximity_hint(f32::INFINITY),
        }
    }

    /// Compute feedback for the given distances and cursor position
    pub fn compute(
        palette: &Palette,
        tuning: &FeedbackTuning,
        target_distance: f32,
        hazard_distance: f32,
        cursor_x: f32,
        viewport_width: f32,
    ) -> Self {
        let background = background_color(palette, tuning, target_distance, hazard_distance);
        Self {
            background,
            gradient_end: background.darken(GRADIENT_DARKEN),
            gradient_angle: gradient_angle(cursor_x, viewport_width),
            target_percent: closeness_percent(target_distance, tuning.target_bar_distance),
            hazard_percent: closeness_percent(hazard_distance, tuning.hazard_bar_distance),
            hint: proximity_hint(target_distance),
        }
    }

    /// CSS `linear-gradient(...)` for the page background
    pub fn to_css_gradient(&self) -> String {
        format!(
            "linear-gradient({}deg, {} 0%, {} 100%)",
            self.gradient_angle,
            self.background.to_css(),
            self.gradient_end.to_css()
        )
    }
}

/// Blend base toward the target color, then toward the hazard color.
///
/// The hazard blend is applied to the result of the target blend, so hazard
/// proximity always dominates.
pub fn background_color(
    palette: &Palette,
    tuning: &FeedbackTuning,
    target_distance: f32,
    hazard_distance: f32,
) -> Rgb {
    let mut color = palette.base;

    let target_factor = falloff(target_distance, tuning.target_distance);
    if target_factor > 0.0 {
        color = palette.base.lerp(palette.target, target_factor);
    }

    let hazard_factor = falloff(hazard_distance, tuning.hazard_distance);
    if hazard_factor > 0.0 {
        color = color.lerp(palette.hazard, hazard_factor);
    }

    color
}

/// Gradient angle from the cursor's horizontal position, 0-360 degrees
pub fn gradient_angle(cursor_x: f32, viewport_width: f32) -> f32 {
    if viewport_width <= 0.0 {
        return 0.0;
    }
    cursor_x / viewport_width * 360.0
}

const HINTS: [(f32, &str); 6] = [
    (50.0, "BURNING HOT! Right here!"),
    (100.0, "Very hot! So close!"),
    (150.0, "Hot! Getting warmer..."),
    (250.0, "Warm... keep going"),
    (350.0, "Lukewarm"),
    (450.0, "Cool... far away"),
];

/// Hot/cold message for a target distance
pub fn proximity_hint(target_distance: f32) -> &'static str {
    HINTS
        .iter()
        .find(|(max, _)| target_distance < *max)
        .map(|(_, text)| *text)
        .unwrap_or("Ice cold! Very far...")
}
