//! Session state and entity types
//!
//! A `Session` owns everything a run needs: counters, the current level's
//! targets and hazards, the dot field, and its own seeded RNG. Entities are
//! replaced wholesale on every level transition, restart and resize, so
//! nothing from an old layout outlives it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::LevelConfig;
use super::dots::DotField;
use crate::color::Rgb;
use crate::consts::*;
use crate::distance;
use crate::feedback::Feedback;
use crate::leaderboard::RunRecord;
use crate::settings::Settings;
use crate::theme::ThemePreset;
use crate::theme::Theme;

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No level installed yet
    Idle,
    /// Level placed, waiting for the player to engage
    Ready,
    /// Level running
    Active,
    /// Level cleared; `level` is the one just completed
    Won { level: u32 },
    /// The run is over: caught by a hazard, or finished after a cleared level
    Lost,
}

impl GamePhase {
    /// Whether a run has stopped at a level boundary (cleared or caught);
    /// either way its score can be saved
    pub fn is_between_levels(&self) -> bool {
        matches!(self, GamePhase::Won { .. } | GamePhase::Lost)
    }
}

/// Notable things that happened since the driver last drained events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    LevelActivated { level: u32 },
    TargetRevealed { id: u32, pos: Vec2 },
    LevelWon { level: u32 },
    RunLost { level: u32 },
    /// The player stopped after clearing `level`
    RunFinished { level: u32 },
}

/// A hidden target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    /// One-way: once revealed, always revealed
    pub revealed: bool,
    /// One-way: the player has passed over and left this target
    pub has_been_hovered: bool,
}

impl Target {
    pub fn new(id: u32, pos: Vec2, size: f32) -> Self {
        Self {
            id,
            pos,
            size,
            revealed: false,
            has_been_hovered: false,
        }
    }

    /// Still contributes to proximity feedback
    pub fn is_live(&self) -> bool {
        !self.revealed && !self.has_been_hovered
    }
}

/// A moving hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub size: f32,
}

impl Hazard {
    /// Distance from an edge at which the hazard bounces
    pub fn wall_margin(&self) -> f32 {
        self.size.max(MIN_WALL_MARGIN)
    }

    /// Move by one step and reflect off the viewport edges.
    ///
    /// Each axis is handled on its own: crossing into the margin flips that
    /// velocity component and clamps the position back inside.
    pub fn advance(&mut self, dt: f32, viewport: Viewport) {
        self.pos += self.vel * dt;

        let margin = self.wall_margin();
        let max = viewport.size() - Vec2::splat(margin);

        if self.pos.x < margin || self.pos.x > max.x {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.min(max.x).max(margin);
        }
        if self.pos.y < margin || self.pos.y > max.y {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.min(max.y).max(margin);
        }
    }
}

/// A complete play session (one run, many levels)
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: Settings,
    /// Effective theme, resolved once from settings
    pub theme: Theme,
    pub viewport: Viewport,
    pub cursor: Vec2,

    /// Current level (1-based, only grows within a run)
    pub level: u32,
    /// Resolved difficulty of the current level
    pub level_config: LevelConfig,
    pub phase: GamePhase,
    /// Ready is held until the intro is dismissed
    pub intro_pending: bool,

    /// Targets revealed on the current level
    pub targets_found: u32,
    /// Targets revealed across the run
    pub total_targets_collected: u32,
    /// Levels cleared across the run
    pub levels_completed: u32,
    /// Set once the run's score has been stored
    pub score_submitted: bool,

    pub targets: Vec<Target>,
    pub hazards: Vec<Hazard>,
    pub dots: DotField,

    /// Latest proximity feedback (background, indicators)
    pub feedback: Feedback,
    /// Target currently under the cursor, if any
    pub hovered_target: Option<u32>,

    /// Seconds of active play on the current level
    pub level_time: f32,
    /// Events not yet drained by the driver
    pub events: Vec<GameEvent>,

    pub(super) rng: Pcg32,
    seed: u64,
    next_id: u32,
}

impl Session {
    /// Create an idle session; call `start_level` to install the first level
    pub fn new(settings: Settings, viewport: Viewport, seed: u64) -> Self {
        let theme = settings.theme();
        let level = settings.first_level();
        let level_config = settings.difficulty.level_config(level);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut dots = DotField::new(viewport, settings.dot_spacing);
        dots.assign_glyphs(&mut rng, theme.grid.glyphs);
        let feedback = Feedback::resting(&theme.palette);

        Self {
            settings,
            theme,
            viewport,
            cursor: Vec2::new(CURSOR_SENTINEL.0, CURSOR_SENTINEL.1),
            level,
            level_config,
            phase: GamePhase::Idle,
            intro_pending: false,
            targets_found: 0,
            total_targets_collected: 0,
            levels_completed: 0,
            score_submitted: false,
            targets: Vec::new(),
            hazards: Vec::new(),
            dots,
            feedback,
            hovered_target: None,
            level_time: 0.0,
            events: Vec::new(),
            rng,
            seed,
            next_id: 1,
        }
    }

    /// Seed the session RNG was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The session's random source
    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Replace the dot field with a fresh grid for the current viewport
    pub fn rebuild_dots(&mut self) {
        self.dots = DotField::new(self.viewport, self.settings.dot_spacing);
        self.dots.assign_glyphs(&mut self.rng, self.theme.grid.glyphs);
    }

    /// Switch to a preset theme, dropping any custom one.
    ///
    /// The dot field is rebuilt for the new glyph set; the background
    /// resets to the new palette until the next pointer event.
    pub fn set_theme(&mut self, preset: ThemePreset) {
        self.settings.theme = preset;
        self.settings.custom_theme = None;
        self.theme = self.settings.theme();
        self.feedback = Feedback::resting(&self.theme.palette);
        self.rebuild_dots();
        log::info!("Theme set to {}", preset.as_str());
    }

    /// Current background color
    pub fn background(&self) -> Rgb {
        self.feedback.background
    }

    /// Number of targets with `revealed` set
    pub fn revealed_count(&self) -> u32 {
        self.targets.iter().filter(|t| t.revealed).count() as u32
    }

    /// Distance from the cursor to the closest hazard (infinite if none)
    pub fn nearest_hazard_distance(&self) -> f32 {
        self.hazards
            .iter()
            .map(|h| distance(self.cursor, h.pos))
            .fold(f32::INFINITY, f32::min)
    }

    /// Closest target that still contributes to feedback, with its distance
    pub fn nearest_live_target(&self) -> Option<(u32, f32)> {
        self.targets
            .iter()
            .filter(|t| t.is_live())
            .map(|t| (t.id, distance(self.cursor, t.pos)))
            .fold(None, |best, (id, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((id, d)),
            })
    }

    /// Whether the run can still be played
    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Ready | GamePhase::Active)
    }

    /// Counters as they stand right now, stamped with `nickname` and time
    pub fn run_record(&self, nickname: &str, created_at: f64) -> RunRecord {
        RunRecord {
            nickname: nickname.to_string(),
            total_targets: self.total_targets_collected,
            levels_completed: self.levels_completed,
            created_at,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
