//! Gameplay settings
//!
//! Every simulator takes its tuning from here explicitly; nothing reads a
//! global table. Persisted separately from leaderboard data in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::feedback::FeedbackTuning;
use crate::sim::DifficultyTuning;
use crate::theme::{Theme, ThemePreset};

/// Interaction radii and placement separations (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Cursor closer than this reveals a target
    pub reveal_radius: f32,
    /// Cursor closer than this to a hazard loses the run
    pub collision_radius: f32,
    /// Cursor closer than this marks a target as "currently hovered"
    pub hover_radius: f32,
    /// Sprite size for targets and hazards
    pub entity_size: f32,
    /// Minimum hazard-to-hazard distance at placement
    pub hazard_spacing: f32,
    /// Minimum hazard-to-cursor distance at placement
    pub hazard_cursor_clearance: f32,
    /// Minimum target-to-hazard distance at placement
    pub target_hazard_spacing: f32,
    /// Minimum target-to-cursor distance at placement
    pub target_cursor_clearance: f32,
    /// Height of a bottom band (e.g. a HUD strip) kept free of entities
    pub bottom_exclusion: Option<f32>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            reveal_radius: REVEAL_RADIUS,
            collision_radius: COLLISION_RADIUS,
            hover_radius: REVEAL_RADIUS,
            entity_size: ENTITY_SIZE,
            hazard_spacing: 200.0,
            hazard_cursor_clearance: 250.0,
            target_hazard_spacing: 150.0,
            target_cursor_clearance: 200.0,
            bottom_exclusion: None,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected theme preset
    pub theme: ThemePreset,
    /// Replaces the preset's parameters when set
    pub custom_theme: Option<Theme>,

    /// Level a fresh run starts at
    pub start_level: u32,
    /// Hold each level in Ready until an intro message is dismissed
    pub show_intro: bool,
    /// Grid spacing of the dot field
    pub dot_spacing: f32,

    pub rules: Rules,
    pub difficulty: DifficultyTuning,
    pub feedback: FeedbackTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemePreset::Classic,
            custom_theme: None,
            start_level: 1,
            show_intro: false,
            dot_spacing: DOT_SPACING,
            rules: Rules::default(),
            difficulty: DifficultyTuning::default(),
            feedback: FeedbackTuning::default(),
        }
    }
}

impl Settings {
    /// Settings with a given theme preset and everything else default
    pub fn from_preset(preset: ThemePreset) -> Self {
        Self {
            theme: preset,
            ..Self::default()
        }
    }

    /// Level a fresh run starts at, clamped to `1..=MAX_START_LEVEL`
    pub fn first_level(&self) -> u32 {
        self.start_level.clamp(1, MAX_START_LEVEL)
    }

    /// Effective theme parameters
    pub fn theme(&self) -> Theme {
        self.custom_theme.unwrap_or_else(|| self.theme.theme())
    }

    /// Parse settings, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dot_hunt_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(e) => log::warn!("Could not save settings: {:?}", e),
                },
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_game_constants() {
        let s = Settings::default();
        assert_eq!(s.start_level, 1);
        assert_eq!(s.rules.reveal_radius, 50.0);
        assert_eq!(s.rules.collision_radius, 40.0);
        assert_eq!(s.dot_spacing, 40.0);
        assert_eq!(s.theme(), ThemePreset::Classic.theme());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"theme":"Forest","start_level":3}"#).unwrap();
        assert_eq!(s.theme, ThemePreset::Forest);
        assert_eq!(s.start_level, 3);
        assert_eq!(s.rules, Rules::default());
        assert_eq!(s.theme().dots.push_radius, 200.0);
    }

    #[test]
    fn test_stored_start_level_is_clamped() {
        let s = Settings::from_json(r#"{"start_level":3000000000}"#).unwrap();
        assert_eq!(s.first_level(), MAX_START_LEVEL);
        let s = Settings::from_json(r#"{"start_level":0}"#).unwrap();
        assert_eq!(s.first_level(), 1);
    }

    #[test]
    fn test_custom_theme_overrides_preset() {
        let mut custom = ThemePreset::Severance.theme();
        custom.dots.danger_zone = 320.0;
        let s = Settings {
            custom_theme: Some(custom),
            ..Settings::default()
        };
        assert_eq!(s.theme().dots.danger_zone, 320.0);
    }

    #[test]
    fn test_json_round_trip() {
        let s = Settings::from_preset(ThemePreset::Severance);
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }
}
