//! Player preferences
//!
//! Persisted in LocalStorage on the web build.

use serde::{Deserialize, Serialize};

use crate::consts::{AUDIO_OFFSET, NOTE_SPEED, SENSITIVITY};
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Scroll speed (units/s)
    pub note_speed: f32,
    /// Mouse sensitivity multiplier
    pub sensitivity: f32,
    /// Audio calibration offset (seconds)
    #[serde(default = "default_offset")]
    pub audio_offset: f64,
}

fn default_offset() -> f64 {
    AUDIO_OFFSET
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            note_speed: NOTE_SPEED,
            sensitivity: SENSITIVITY,
            audio_offset: AUDIO_OFFSET,
        }
    }
}

/// Positive finite number or `fallback`
fn parse_positive(text: &str, fallback: f32) -> f32 {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(fallback)
}

impl Settings {
    /// Apply the settings form; unusable entries fall back to defaults
    pub fn apply_form(&mut self, speed: &str, sensitivity: &str) {
        self.note_speed = parse_positive(speed, NOTE_SPEED);
        self.sensitivity = parse_positive(sensitivity, SENSITIVITY);
    }

    /// Timing constants for a session played with these settings
    pub fn tuning(&self) -> Tuning {
        Tuning {
            note_speed: self.note_speed,
            audio_offset: self.audio_offset,
            ..Tuning::default()
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hitplane_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
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
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
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
    fn test_apply_form() {
        let mut settings = Settings::default();
        settings.apply_form("200", " 0.8 ");
        assert_eq!(settings.note_speed, 200.0);
        assert_eq!(settings.sensitivity, 0.8);
    }

    #[test]
    fn test_apply_form_fallbacks() {
        let mut settings = Settings::default();
        settings.apply_form("fast", "0");
        assert_eq!(settings.note_speed, NOTE_SPEED);
        assert_eq!(settings.sensitivity, SENSITIVITY);
        settings.apply_form("-5", "NaN");
        assert_eq!(settings.note_speed, NOTE_SPEED);
        assert_eq!(settings.sensitivity, SENSITIVITY);
    }

    #[test]
    fn test_tuning_follows_speed() {
        let mut settings = Settings::default();
        settings.apply_form("400", "1");
        let tuning = settings.tuning();
        assert_eq!(tuning.note_speed, 400.0);
        assert!((tuning.lead_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_offset_uses_default() {
        let settings: Settings =
            serde_json::from_str(r#"{"note_speed":150.0,"sensitivity":1.2}"#).unwrap();
        assert_eq!(settings.audio_offset, AUDIO_OFFSET);
    }
}
