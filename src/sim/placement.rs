//! Rejection-sampled entity placement
//!
//! Draws uniform points inside the viewport until one clears every
//! separation constraint. The draw count is capped so that infeasible
//! layouts (too many hazards on a small screen) fail instead of hanging.

use glam::Vec2;
use rand::Rng;
use thiserror::Error;

use super::state::Viewport;
use crate::consts::MAX_PLACEMENT_ATTEMPTS;
use crate::distance;

/// A point that a new placement must keep its distance from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub pos: Vec2,
    pub min_distance: f32,
}

impl Obstacle {
    pub fn new(pos: Vec2, min_distance: f32) -> Self {
        Self { pos, min_distance }
    }
}

/// Constraints for a single placement
#[derive(Debug, Clone)]
pub struct PlacementRequest<'a> {
    /// Sprite size; the point stays `size` away from every edge
    pub size: f32,
    pub obstacles: &'a [Obstacle],
    pub cursor: Obstacle,
    /// Height of a band along the bottom edge that must stay empty
    pub bottom_exclusion: Option<f32>,
    pub max_attempts: u32,
}

impl<'a> PlacementRequest<'a> {
    pub fn new(size: f32, obstacles: &'a [Obstacle], cursor: Obstacle) -> Self {
        Self {
            size,
            obstacles,
            cursor,
            bottom_exclusion: None,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }

    pub fn with_bottom_exclusion(mut self, band: Option<f32>) -> Self {
        self.bottom_exclusion = band;
        self
    }

    /// Whether `candidate` satisfies every constraint
    pub fn accepts(&self, candidate: Vec2, viewport: Viewport) -> bool {
        if let Some(band) = self.bottom_exclusion {
            if candidate.y >= viewport.height - band {
                return false;
            }
        }
        if distance(candidate, self.cursor.pos) < self.cursor.min_distance {
            return false;
        }
        self.obstacles
            .iter()
            .all(|o| distance(candidate, o.pos) >= o.min_distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlacementError {
    #[error("no valid position found after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("viewport {width}x{height} cannot fit an entity of size {size}")]
    ViewportTooSmall { width: f32, height: f32, size: f32 },
}

/// Draw a position satisfying `request`
pub fn place<R: Rng + ?Sized>(
    rng: &mut R,
    viewport: Viewport,
    request: &PlacementRequest<'_>,
) -> Result<Vec2, PlacementError> {
    let size = request.size;
    let span_x = viewport.width - size * 2.0;
    let span_y = viewport.height - size * 2.0;
    if span_x < 0.0 || span_y < 0.0 {
        return Err(PlacementError::ViewportTooSmall {
            width: viewport.width,
            height: viewport.height,
            size,
        });
    }

    for _ in 0..request.max_attempts {
        let candidate = Vec2::new(
            rng.random::<f32>() * span_x + size,
            rng.random::<f32>() * span_y + size,
        );
        if request.accepts(candidate, viewport) {
            return Ok(candidate);
        }
    }

    Err(PlacementError::Exhausted {
        attempts: request.max_attempts,
    })
}
