//! Pointer-driven game logic
//!
//! Runs synchronously on every pointer or touch move: activation, hover
//! bookkeeping, reveals, hazard collision, and level completion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, Session};
use crate::distance;
use crate::feedback::Feedback;

/// Where a pointer event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerSource {
    Mouse,
    /// First touch point of a touch event
    Touch,
}

/// A cursor position update in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pos: Vec2,
    pub source: PointerSource,
}

impl PointerEvent {
    pub fn mouse(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            source: PointerSource::Mouse,
        }
    }

    pub fn touch(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            source: PointerSource::Touch,
        }
    }
}

/// Whether this event counts as the player engaging with the field.
///
/// Any touch does; a mouse has to come close enough to disturb the dots.
pub fn engages(session: &Session, event: &PointerEvent) -> bool {
    match event.source {
        PointerSource::Touch => true,
        PointerSource::Mouse => session.dots.is_influenced_by(event.pos, &session.theme.dots),
    }
}

/// Handle a pointer move
pub fn pointer_moved(session: &mut Session, event: PointerEvent) {
    session.cursor = event.pos;

    match session.phase {
        GamePhase::Ready => {
            if session.intro_pending || !engages(session, &event) {
                return;
            }
            session.phase = GamePhase::Active;
            session.events.push(GameEvent::LevelActivated {
                level: session.level,
            });
            log::info!("Level {} active", session.level);
        }
        GamePhase::Active => {}
        _ => return,
    }

    update_hover(session);
    if reveal_targets(session) > 0 {
        // Revealed targets drop out of hover tracking right away
        update_hover(session);
    }
    refresh_feedback(session);

    if touches_hazard(session) {
        lose(session);
    } else if session.targets_found >= session.level_config.targets {
        win(session);
    }
}

/// Recompute background and indicators for the current cursor
pub fn refresh_feedback(session: &mut Session) {
    let target_distance = session
        .nearest_live_target()
        .map(|(_, d)| d)
        .unwrap_or(f32::INFINITY);
    let hazard_distance = session.nearest_hazard_distance();

    session.feedback = Feedback::compute(
        &session.theme.palette,
        &session.settings.feedback,
        target_distance,
        hazard_distance,
        session.cursor.x,
        session.viewport.width,
    );
}

/// Track the target under the cursor; latch it once the cursor leaves
fn update_hover(session: &mut Session) {
    let radius = session.settings.rules.hover_radius;
    match session.nearest_live_target() {
        Some((id, d)) if d < radius => session.hovered_target = Some(id),
        _ => {
            if let Some(id) = session.hovered_target.take() {
                if let Some(target) = session.targets.iter_mut().find(|t| t.id == id) {
                    target.has_been_hovered = true;
                }
            }
        }
    }
}

/// Reveal every hidden target under the cursor; returns how many
fn reveal_targets(session: &mut Session) -> u32 {
    let radius = session.settings.rules.reveal_radius;
    let cursor = session.cursor;
    let mut revealed = 0;

    for target in session.targets.iter_mut() {
        if target.revealed || distance(cursor, target.pos) >= radius {
            continue;
        }
        target.revealed = true;
        revealed += 1;
        session.events.push(GameEvent::TargetRevealed {
            id: target.id,
            pos: target.pos,
        });
        log::debug!("Target {} revealed at {:?}", target.id, target.pos);
    }

    session.targets_found += revealed;
    session.total_targets_collected += revealed;
    revealed
}

fn touches_hazard(session: &Session) -> bool {
    let radius = session.settings.rules.collision_radius;
    session
        .hazards
        .iter()
        .any(|h| distance(session.cursor, h.pos) < radius)
}

fn win(session: &mut Session) {
    let completed = session.level;
    session.levels_completed += 1;
    session.level = session.level.saturating_add(1);
    session.phase = GamePhase::Won { level: completed };
    session.events.push(GameEvent::LevelWon { level: completed });
    log::info!(
        "Level {} complete ({} levels, {} targets this run)",
        completed,
        session.levels_completed,
        session.total_targets_collected
    );
}

fn lose(session: &mut Session) {
    session.phase = GamePhase::Lost;
    session.events.push(GameEvent::RunLost {
        level: session.level,
    });
    log::info!(
        "Caught on level {}: {} targets, {} levels completed",
        session.level,
        session.total_targets_collected,
        session.levels_completed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::level::start_level;
    use crate::sim::state::{Hazard, Target, Viewport};

    const VIEW: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    fn ready_session(level: u32) -> Session {
        let settings = Settings {
            start_level: level,
            ..Settings::default()
        };
        let mut s = Session::new(settings, VIEW, 2024);
        start_level(&mut s).unwrap();
        s
    }

    /// Move to an empty spot far from every entity to activate the level
    fn activate(s: &mut Session) {
        let spot = Vec2::new(640.0, 400.0);
        let saved_targets = s.targets.clone();
        let saved_hazards = s.hazards.clone();
        s.targets.clear();
        s.hazards.clear();
        pointer_moved(s, PointerEvent::mouse(spot.x, spot.y));
        s.targets = saved_targets;
        s.hazards = saved_hazards;
        assert_eq!(s.phase, GamePhase::Active);
    }

    #[test]
    fn test_offscreen_mouse_does_not_activate() {
        let mut s = ready_session(1);
        pointer_moved(&mut s, PointerEvent::mouse(-500.0, -500.0));
        assert_eq!(s.phase, GamePhase::Ready);
        pointer_moved(&mut s, PointerEvent::mouse(20.0, 20.0));
        assert_eq!(s.phase, GamePhase::Active);
    }

    #[test]
    fn test_touch_always_activates() {
        let mut s = ready_session(1);
        pointer_moved(&mut s, PointerEvent::touch(-500.0, -500.0));
        assert_eq!(s.phase, GamePhase::Active);
    }

    #[test]
    fn test_intro_blocks_activation() {
        let mut s = ready_session(1);
        s.intro_pending = true;
        pointer_moved(&mut s, PointerEvent::touch(100.0, 100.0));
        assert_eq!(s.phase, GamePhase::Ready);
        crate::sim::level::dismiss_intro(&mut s);
        pointer_moved(&mut s, PointerEvent::touch(100.0, 100.0));
        assert_eq!(s.phase, GamePhase::Active);
    }

    #[test]
    fn test_level_one_sweep_wins() {
        let mut s = ready_session(1);
        assert_eq!(s.hazards.len(), 0);
        assert_eq!(s.targets.len(), 3);
        activate(&mut s);

        let positions: Vec<Vec2> = s.targets.iter().map(|t| t.pos).collect();
        for pos in positions {
            pointer_moved(&mut s, PointerEvent::mouse(pos.x, pos.y));
            assert_eq!(s.targets_found, s.revealed_count());
        }

        assert_eq!(s.phase, GamePhase::Won { level: 1 });
        assert_eq!(s.levels_completed, 1);
        assert_eq!(s.level, 2);
        assert_eq!(s.total_targets_collected, 3);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::LevelWon { level: 1 }));

        // Next level installs level 2
        start_level(&mut s).unwrap();
        assert_eq!(s.phase, GamePhase::Ready);
        assert_eq!(s.hazards.len(), 1);
        assert_eq!(s.targets_found, 0);
        assert_eq!(s.total_targets_collected, 3);
    }

    #[test]
    fn test_reveal_is_one_way_and_counted_once() {
        let mut s = ready_session(3);
        activate(&mut s);
        s.targets = vec![Target::new(100, Vec2::new(400.0, 300.0), 40.0)];
        let pos = s.targets[0].pos;
        pointer_moved(&mut s, PointerEvent::mouse(pos.x + 10.0, pos.y));
        pointer_moved(&mut s, PointerEvent::mouse(pos.x - 10.0, pos.y));
        pointer_moved(&mut s, PointerEvent::mouse(pos.x, pos.y));
        assert!(s.targets[0].revealed);
        assert_eq!(s.targets_found, 1);
        assert_eq!(s.total_targets_collected, 1);
    }

    #[test]
    fn test_reveal_radius_is_strict() {
        let mut s = ready_session(1);
        activate(&mut s);
        s.targets = vec![Target::new(100, Vec2::new(300.0, 300.0), 40.0)];
        pointer_moved(&mut s, PointerEvent::mouse(350.0, 300.0));
        assert!(!s.targets[0].revealed);
        pointer_moved(&mut s, PointerEvent::mouse(349.0, 300.0));
        assert!(s.targets[0].revealed);
    }

    #[test]
    fn test_hazard_collision_loses_and_freezes() {
        let mut s = ready_session(2);
        assert_eq!(s.hazards.len(), 1);
        activate(&mut s);

        // Collect a target first so the record has something in it
        let t = s.targets[0].pos;
        pointer_moved(&mut s, PointerEvent::mouse(t.x, t.y));
        let collected = s.total_targets_collected;
        assert!(collected >= 1);

        let h = s.hazards[0].pos;
        pointer_moved(&mut s, PointerEvent::mouse(h.x + 39.0, h.y));
        assert_eq!(s.phase, GamePhase::Lost);

        let record = s.run_record("tester", 0.0);
        assert_eq!(record.total_targets, collected);
        assert_eq!(record.levels_completed, 0);

        // Frozen: further movement changes nothing
        let hidden = s.targets.iter().position(|t| !t.revealed).unwrap();
        let t2 = s.targets[hidden].pos;
        pointer_moved(&mut s, PointerEvent::mouse(t2.x, t2.y));
        assert!(!s.targets[hidden].revealed);
        assert_eq!(s.total_targets_collected, collected);
        assert_eq!(s.phase, GamePhase::Lost);
    }

    #[test]
    fn test_collision_beats_completion_on_same_move() {
        let mut s = ready_session(2);
        activate(&mut s);
        let spot = Vec2::new(500.0, 500.0);
        s.targets = vec![Target::new(50, spot, 40.0)];
        s.level_config.targets = 1;
        s.hazards = vec![Hazard {
            id: 51,
            pos: spot + Vec2::new(20.0, 0.0),
            vel: Vec2::ZERO,
            size: 40.0,
        }];
        pointer_moved(&mut s, PointerEvent::mouse(spot.x, spot.y));
        assert_eq!(s.phase, GamePhase::Lost);
        assert_eq!(s.levels_completed, 0);
    }

    #[test]
    fn test_hover_latches_after_leaving() {
        let mut s = ready_session(1);
        activate(&mut s);
        // Hover radius larger than reveal so hovering without revealing is possible
        s.settings.rules.hover_radius = 120.0;
        s.targets = vec![
            Target::new(7, Vec2::new(300.0, 300.0), 40.0),
            Target::new(8, Vec2::new(900.0, 600.0), 40.0),
        ];

        pointer_moved(&mut s, PointerEvent::mouse(380.0, 300.0));
        assert_eq!(s.hovered_target, Some(7));
        assert!(!s.targets[0].has_been_hovered);

        pointer_moved(&mut s, PointerEvent::mouse(600.0, 300.0));
        assert_eq!(s.hovered_target, None);
        assert!(s.targets[0].has_been_hovered);
        assert!(!s.targets[0].revealed);

        // The latched target no longer drives feedback
        assert_eq!(s.nearest_live_target().map(|(id, _)| id), Some(8));
    }

    #[test]
    fn test_feedback_tracks_cursor() {
        let mut s = ready_session(1);
        activate(&mut s);
        s.targets = vec![Target::new(9, Vec2::new(300.0, 300.0), 40.0)];
        let far = s.feedback.background;
        pointer_moved(&mut s, PointerEvent::mouse(300.0, 380.0));
        assert_ne!(s.feedback.background, far);
        assert_eq!(s.feedback.target_percent, 80.0);
        assert_eq!(s.feedback.hint, "Very hot! So close!");
    }

    #[test]
    fn test_moves_ignored_when_idle_or_won() {
        let settings = Settings::default();
        let mut s = Session::new(settings, VIEW, 1);
        pointer_moved(&mut s, PointerEvent::touch(10.0, 10.0));
        assert_eq!(s.phase, GamePhase::Idle);
        assert_eq!(s.cursor, Vec2::new(10.0, 10.0));

        s.phase = GamePhase::Won { level: 1 };
        s.targets = vec![Target::new(1, Vec2::new(10.0, 10.0), 40.0)];
        pointer_moved(&mut s, PointerEvent::touch(10.0, 10.0));
        assert!(!s.targets[0].revealed);
    }
}
