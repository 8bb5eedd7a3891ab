//! Dot Hunt - a cursor-driven treasure hunt over a reactive dot field
//!
//! Core modules:
//! - `sim`: Session state machine, dot field, hazard motion, placement
//! - `feedback`: Background color and proximity indicators
//! - `color`: RGB helpers shared by the field and the feedback renderer
//! - `theme`: Palette and dot behavior presets
//! - `settings`: Injected gameplay configuration
//! - `leaderboard`: Run records, submission latch, score stores

pub mod color;
pub mod feedback;
pub mod leaderboard;
pub mod settings;
pub mod sim;
pub mod theme;

pub use color::Rgb;
pub use leaderboard::{Leaderboard, MemoryStore, RunRecord, ScoreStore};
pub use settings::Settings;
pub use theme::{Theme, ThemePreset};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Spacing between grid dots in pixels
    pub const DOT_SPACING: f32 = 40.0;

    /// Off-screen cursor position used until the first input event
    pub const CURSOR_SENTINEL: (f32, f32) = (-1000.0, -1000.0);

    /// Cursor must come this close to a target to reveal it
    pub const REVEAL_RADIUS: f32 = 50.0;
    /// Cursor within this distance of a hazard ends the run
    pub const COLLISION_RADIUS: f32 = 40.0;

    /// Default sprite size for targets and hazards
    pub const ENTITY_SIZE: f32 = 40.0;
    /// Hazards never bounce closer than this to a viewport edge
    pub const MIN_WALL_MARGIN: f32 = 40.0;

    /// Rejection sampling gives up after this many draws
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

    /// Hazard speed at levels 1-2 (pixels/s, 0.5 px per frame at 60 Hz)
    pub const HAZARD_BASE_SPEED: f32 = 30.0;
    /// Geometric speed growth per level beyond level 2
    pub const HAZARD_SPEED_GROWTH: f32 = 1.10;
    /// Highest level a run may start at; later levels are only reached by play
    pub const MAX_START_LEVEL: u32 = 99;
    /// Hazard count never exceeds this
    pub const MAX_HAZARDS: u32 = 8;

    /// Background reaches the target color at distance 0, base color beyond this
    pub const TARGET_FEEDBACK_DISTANCE: f32 = 400.0;
    /// Background reaches the hazard color at distance 0, no influence beyond this
    pub const HAZARD_FEEDBACK_DISTANCE: f32 = 300.0;

    /// Nominal frame step used by drivers before the first real timestamp
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest frame step the simulation accepts (tab switches etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Map a distance onto a 0-100 "closeness" percentage (0 at `max`, 100 at 0)
#[inline]
pub fn closeness_percent(distance: f32, max: f32) -> f32 {
    ((1.0 - distance / max) * 100.0).clamp(0.0, 100.0)
}

/// Linear falloff factor: 1 at distance 0, 0 at or beyond `radius`
#[inline]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        0.0
    } else {
        1.0 - distance / radius
    }
}
