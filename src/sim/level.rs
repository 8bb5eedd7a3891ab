//! Level setup and teardown
//!
//! Installing a level replaces the whole entity set: hazards are placed
//! first, then targets keep their distance from those hazards. Restart and
//! resize go through the same path.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::placement::{Obstacle, PlacementError, PlacementRequest, place};
use super::state::{GameEvent, GamePhase, Hazard, Session, Target, Viewport};
use crate::consts::MAX_START_LEVEL;

/// Install the session's current level and move to `Ready`.
///
/// On a lost run this does nothing; use [`restart`] instead. If placement
/// fails the session is left `Idle` with no entities.
pub fn start_level(session: &mut Session) -> Result<(), PlacementError> {
    if session.phase == GamePhase::Lost {
        log::warn!("start_level ignored: run is over, restart first");
        return Ok(());
    }

    session.level_config = session.settings.difficulty.level_config(session.level);
    session.targets_found = 0;
    session.hovered_target = None;
    session.level_time = 0.0;
    session.rebuild_dots();

    if let Err(e) = populate(session) {
        log::warn!("Level {} setup failed: {}", session.level, e);
        session.phase = GamePhase::Idle;
        return Err(e);
    }

    session.phase = GamePhase::Ready;
    session.intro_pending = session.settings.show_intro;
    super::input::refresh_feedback(session);
    session.events.push(GameEvent::LevelStarted {
        level: session.level,
    });

    log::info!(
        "Level {}: {} hazards, {} targets, hazard speed {:.1}px/s",
        session.level,
        session.level_config.hazards,
        session.level_config.targets,
        session.level_config.hazard_speed
    );

    Ok(())
}

/// Begin a fresh run at `level` (or the configured start level)
pub fn restart(session: &mut Session, level: Option<u32>) -> Result<(), PlacementError> {
    session.level = level
        .map(|l| l.clamp(1, MAX_START_LEVEL))
        .unwrap_or_else(|| session.settings.first_level());
    session.total_targets_collected = 0;
    session.levels_completed = 0;
    session.score_submitted = false;
    session.phase = GamePhase::Idle;
    session.events.clear();

    log::info!("Run restarted at level {}", session.level);
    start_level(session)
}

/// React to a viewport change: rebuild the field and, while a level is in
/// play, re-place every entity.
///
/// The per-level found counter restarts at zero because every target is new;
/// run totals are kept.
pub fn resize(session: &mut Session, viewport: Viewport) -> Result<(), PlacementError> {
    session.viewport = viewport;
    session.rebuild_dots();

    if !session.is_running() {
        return Ok(());
    }

    session.targets_found = 0;
    session.hovered_target = None;
    if let Err(e) = populate(session) {
        log::warn!(
            "Resize to {}x{} failed to place level {}: {}",
            viewport.width,
            viewport.height,
            session.level,
            e
        );
        session.phase = GamePhase::Idle;
        return Err(e);
    }
    super::input::refresh_feedback(session);
    Ok(())
}

/// Stop the run on a cleared-level screen instead of playing on.
///
/// Only valid while `Won`; counters freeze as they are.
pub fn finish_run(session: &mut Session) {
    let GamePhase::Won { level } = session.phase else {
        return;
    };
    session.phase = GamePhase::Lost;
    session.events.push(GameEvent::RunFinished { level });
    log::info!(
        "Run finished after level {}: {} targets, {} levels",
        level,
        session.total_targets_collected,
        session.levels_completed
    );
}

/// Let a level held in `Ready` by its intro message start
pub fn dismiss_intro(session: &mut Session) {
    session.intro_pending = false;
}

/// Replace hazards and targets with a fresh layout for the current level
fn populate(session: &mut Session) -> Result<(), PlacementError> {
    // Old entities must be gone before anything new is placed
    session.hazards.clear();
    session.targets.clear();

    let rules = session.settings.rules;
    let config = session.level_config;
    let viewport = session.viewport;
    let cursor = session.cursor;

    let mut hazards = Vec::with_capacity(config.hazards as usize);
    let mut spacing = Vec::with_capacity(config.hazards as usize);
    for _ in 0..config.hazards {
        let request = PlacementRequest::new(
            rules.entity_size,
            &spacing,
            Obstacle::new(cursor, rules.hazard_cursor_clearance),
        )
        .with_bottom_exclusion(rules.bottom_exclusion);
        let pos = place(session.rng_mut(), viewport, &request)?;
        let heading = session.rng_mut().random::<f32>() * TAU;

        hazards.push(Hazard {
            id: session.next_entity_id(),
            pos,
            vel: Vec2::from_angle(heading) * config.hazard_speed,
            size: rules.entity_size,
        });
        spacing.push(Obstacle::new(pos, rules.hazard_spacing));
    }

    let around_hazards: Vec<Obstacle> = hazards
        .iter()
        .map(|h| Obstacle::new(h.pos, rules.target_hazard_spacing))
        .collect();
    let mut targets = Vec::with_capacity(config.targets as usize);
    for _ in 0..config.targets {
        let request = PlacementRequest::new(
            rules.entity_size,
            &around_hazards,
            Obstacle::new(cursor, rules.target_cursor_clearance),
        )
        .with_bottom_exclusion(rules.bottom_exclusion);
        let pos = place(session.rng_mut(), viewport, &request)?;
        targets.push(Target::new(session.next_entity_id(), pos, rules.entity_size));
    }

    session.hazards = hazards;
    session.targets = targets;
    Ok(())
}
