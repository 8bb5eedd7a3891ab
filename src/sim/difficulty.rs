//! Level difficulty progression
//!
//! Levels are unbounded; difficulty grows by hazard count (capped), target
//! count (linear), and hazard speed (geometric).

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable difficulty curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Upper bound on hazards per level
    pub max_hazards: u32,
    /// Targets on the first levels
    pub base_targets: u32,
    /// Last level that still uses `base_targets`
    pub flat_target_levels: u32,
    /// Extra targets per level after the flat stretch
    pub targets_per_level: u32,
    /// Hazard speed (pixels/s) before growth starts
    pub base_hazard_speed: f32,
    /// Last level that still uses `base_hazard_speed`
    pub flat_speed_levels: u32,
    /// Per-level speed multiplier after the flat stretch
    pub hazard_speed_growth: f32,
    /// First level whose hazards move
    pub moving_hazards_from: u32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            max_hazards: MAX_HAZARDS,
            base_targets: 3,
            flat_target_levels: 2,
            targets_per_level: 2,
            base_hazard_speed: HAZARD_BASE_SPEED,
            flat_speed_levels: 2,
            hazard_speed_growth: HAZARD_SPEED_GROWTH,
            moving_hazards_from: 1,
        }
    }
}

/// Resolved parameters for a single level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub hazards: u32,
    pub targets: u32,
    /// Hazard speed in pixels/s
    pub hazard_speed: f32,
    pub moving_hazards: bool,
}

impl DifficultyTuning {
    /// Parameters for `level` (levels below 1 are treated as 1)
    pub fn level_config(&self, level: u32) -> LevelConfig {
        let level = level.max(1);

        let hazards = (level - 1).min(self.max_hazards);

        let targets = if level <= self.flat_target_levels {
            self.base_targets
        } else {
            let extra = self.targets_per_level.saturating_mul(level - self.flat_target_levels);
            self.base_targets.saturating_add(extra)
        };

        let hazard_speed = if level <= self.flat_speed_levels {
            self.base_hazard_speed
        } else {
            let exponent = (level - self.flat_speed_levels).min(i32::MAX as u32) as i32;
            // Stays finite so hazard motion never produces NaN
            (self.base_hazard_speed * self.hazard_speed_growth.powi(exponent)).min(f32::MAX)
        };

        LevelConfig {
            level,
            hazards,
            targets,
            hazard_speed,
            moving_hazards: level >= self.moving_hazards_from,
        }
    }
}

/// Difficulty for `level` with the default curve
pub fn level_config(level: u32) -> LevelConfig {
    DifficultyTuning::default().level_config(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_levels() {
        let l1 = level_config(1);
        assert_eq!((l1.hazards, l1.targets), (0, 3));
        let l2 = level_config(2);
        assert_eq!((l2.hazards, l2.targets), (1, 3));
        let l3 = level_config(3);
        assert_eq!((l3.hazards, l3.targets), (2, 5));
        let l5 = level_config(5);
        assert_eq!((l5.hazards, l5.targets), (4, 9));
    }

    #[test]
    fn test_hazard_cap() {
        assert_eq!(level_config(9).hazards, 8);
        assert_eq!(level_config(50).hazards, 8);
    }

    #[test]
    fn test_speed_growth() {
        assert_eq!(level_config(1).hazard_speed, HAZARD_BASE_SPEED);
        assert_eq!(level_config(2).hazard_speed, HAZARD_BASE_SPEED);
        let l4 = level_config(4).hazard_speed;
        assert!((l4 - HAZARD_BASE_SPEED * 1.21).abs() < 1e-3);
    }

    #[test]
    fn test_level_zero_clamps_to_one() {
        assert_eq!(level_config(0), level_config(1));
    }

    #[test]
    fn test_huge_levels_saturate() {
        let c = level_config(3_000_000_000);
        assert_eq!(c.hazards, 8);
        assert_eq!(c.targets, u32::MAX);
        assert!(c.hazard_speed.is_finite());

        let top = level_config(u32::MAX);
        assert_eq!(top.targets, u32::MAX);
        assert!(top.hazard_speed >= c.hazard_speed);
    }

    #[test]
    fn test_custom_tuning() {
        let tuning = DifficultyTuning {
            max_hazards: 3,
            moving_hazards_from: 4,
            ..DifficultyTuning::default()
        };
        assert_eq!(tuning.level_config(10).hazards, 3);
        assert!(!tuning.level_config(3).moving_hazards);
        assert!(tuning.level_config(4).moving_hazards);
    }

    proptest! {
        #[test]
        fn prop_matches_closed_form(n in 1u32..500) {
            let c = level_config(n);
            let hazards = if n == 1 { 0 } else { (n - 1).min(8) };
            let targets = if n <= 2 { 3 } else { 3 + 2 * (n - 2) };
            prop_assert_eq!(c.hazards, hazards);
            prop_assert_eq!(c.targets, targets);
        }

        #[test]
        fn prop_monotonic(n in 1u32..500) {
            let a = level_config(n);
            let b = level_config(n + 1);
            prop_assert!(b.hazards >= a.hazards);
            prop_assert!(b.targets >= a.targets);
            prop_assert!(b.hazard_speed >= a.hazard_speed);
        }
    }
}
