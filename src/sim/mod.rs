//! Deterministic game simulation
//!
//! All gameplay logic lives here. Given the same settings, seed, and input
//! sequence a session plays out identically:
//! - Seeded RNG only, owned by the session
//! - Pointer events drive reveals, collisions and level transitions
//! - The frame tick only moves hazards and animates the dot field
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod dots;
pub mod input;
pub mod level;
pub mod placement;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use difficulty::{DifficultyTuning, LevelConfig, level_config};
pub use dots::{Dot, DotField, DotVisual};
pub use input::{PointerEvent, PointerSource, pointer_moved};
pub use level::{dismiss_intro, finish_run, resize, restart, start_level};
pub use placement::{Obstacle, PlacementError, PlacementRequest, place};
pub use snapshot::Snapshot;
pub use state::{GameEvent, GamePhase, Hazard, Session, Target, Viewport};
pub use tick::tick;
