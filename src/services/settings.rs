//! Player Settings

use serde::{Serialize, Deserialize};

use crate::game::motion::MotionConfig;

/// Lowest accepted shake sensitivity.
pub const MIN_SENSITIVITY: f64 = 0.5;

/// Highest accepted shake sensitivity.
pub const MAX_SENSITIVITY: f64 = 2.0;

/// Player-facing toggles. Missing fields take their defaults when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Sound effects on
    pub sound_enabled: bool,
    /// Background music on
    pub music_enabled: bool,
    /// Haptics on
    pub haptic_enabled: bool,
    /// Shake sensitivity multiplier, as stored (may be out of range)
    pub shake_sensitivity: f64,
    /// Show a shake button instead of reading the accelerometer
    pub use_button_instead_of_shake: bool,
    /// Follow the system text size
    pub dynamic_font_size: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            haptic_enabled: true,
            shake_sensitivity: 1.0,
            use_button_instead_of_shake: false,
            dynamic_font_size: true,
        }
    }
}

impl GameSettings {
    /// Sensitivity clamped to the accepted range.
    pub fn clamped_sensitivity(&self) -> f64 {
        if !self.shake_sensitivity.is_finite() {
            return 1.0;
        }
        self.shake_sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
    }

    /// Detector tuning with this player's sensitivity applied.
    pub fn motion_config(&self, base: MotionConfig) -> MotionConfig {
        MotionConfig {
            sensitivity: self.clamped_sensitivity(),
            ..base
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
