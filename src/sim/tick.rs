//! Per-frame simulation step
//!
//! Pointer events drive the game logic; the frame tick only moves hazards
//! and animates the dot field.

use super::state::{GamePhase, Session};
use crate::consts::*;

/// Advance the session by `dt` seconds.
///
/// `dt` is clamped to `[0, MAX_FRAME_DT]` so a backgrounded tab does not
/// teleport hazards on return.
pub fn tick(session: &mut Session, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    if session.phase == GamePhase::Idle {
        return;
    }

    if session.phase == GamePhase::Active {
        session.level_time += dt;
        if session.level_config.moving_hazards {
            let viewport = session.viewport;
            for hazard in session.hazards.iter_mut() {
                hazard.advance(dt, viewport);
            }
        }
    }

    let nearest_hazard = session.nearest_hazard_distance();
    let background = session.background();
    session.dots.update(
        &mut session.rng,
        session.cursor,
        nearest_hazard,
        &session.theme,
        background,
    );
}
