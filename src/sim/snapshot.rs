//! Read-only view of a session for presentation layers
//!
//! Drivers paint from a `Snapshot` and never touch `Session` internals.
//! It serializes to JSON for the headless build and for debugging.

use glam::Vec2;
use serde::Serialize;

use super::state::{GamePhase, Session};
use crate::color::Rgba;
use crate::feedback::Feedback;

/// A dot as it should be drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DotSprite {
    pub pos: Vec2,
    pub scale: f32,
    pub opacity: f32,
    pub color: Rgba,
    /// Character to draw; a circle when `None`
    pub glyph: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetView {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub revealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazardView {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
}

/// Everything needed to draw one frame and its HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub intro_pending: bool,
    pub level: u32,
    pub targets_found: u32,
    pub targets_total: u32,
    pub total_targets_collected: u32,
    pub levels_completed: u32,
    pub score_submitted: bool,
    pub cursor: Vec2,
    pub feedback: Feedback,
    /// Only dots with non-zero opacity
    pub dots: Vec<DotSprite>,
    /// Font size for glyph dots
    pub glyph_size: f32,
    pub targets: Vec<TargetView>,
    pub hazards: Vec<HazardView>,
}

impl Snapshot {
    pub fn capture(session: &Session) -> Self {
        let dots = session
            .dots
            .dots()
            .iter()
            .zip(session.dots.visuals())
            .filter(|(_, v)| v.opacity > 0.0)
            .map(|(dot, v)| DotSprite {
                pos: dot.origin + v.offset,
                scale: v.scale,
                opacity: v.opacity,
                color: v.color,
                glyph: dot.glyph,
            })
            .collect();

        Self {
            phase: session.phase,
            intro_pending: session.intro_pending,
            level: session.level,
            targets_found: session.targets_found,
            targets_total: session.level_config.targets,
            total_targets_collected: session.total_targets_collected,
            levels_completed: session.levels_completed,
            score_submitted: session.score_submitted,
            cursor: session.cursor,
            feedback: session.feedback.clone(),
            dots,
            glyph_size: session.theme.grid.font_size,
            targets: session
                .targets
                .iter()
                .map(|t| TargetView {
                    id: t.id,
                    pos: t.pos,
                    size: t.size,
                    revealed: t.revealed,
                })
                .collect(),
            hazards: session
                .hazards
                .iter()
                .map(|h| HazardView {
                    id: h.id,
                    pos: h.pos,
                    size: h.size,
                })
                .collect(),
        }
    }

    /// Short status line for the HUD
    pub fn status_line(&self) -> String {
        match self.phase {
            GamePhase::Idle => "Move to begin".to_string(),
            GamePhase::Ready if self.intro_pending => format!("Level {}", self.level),
            GamePhase::Ready | GamePhase::Active => format!(
                "Level {} - Found {}/{}",
                self.level, self.targets_found, self.targets_total
            ),
            GamePhase::Won { level } => format!("Level {} complete!", level),
            GamePhase::Lost => format!(
                "Game over - {} targets, {} levels",
                self.total_targets_collected, self.levels_completed
            ),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Session {
    /// Capture the current frame
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
