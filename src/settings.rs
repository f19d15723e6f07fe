//! Presentation preferences
//!
//! Persisted in LocalStorage. Nothing here affects the simulation.

use serde::{Deserialize, Serialize};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Silence all beeps
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Full-canvas flash when a level starts
    pub level_flash: bool,
    /// Reduced motion (suppresses the flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 1.0,
            level_flash: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "rising_targets_settings";

    /// Effective level flash (respects reduced_motion)
    pub fn effective_level_flash(&self) -> bool {
        self.level_flash && !self.reduced_motion
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Parse stored settings; unknown or missing fields fall back to defaults
    pub fn from_json(json: &str) -> Option<Self> {
        let mut settings: Self = serde_json::from_str(json).ok()?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        Some(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|storage| storage.get_item(Self::STORAGE_KEY).ok().flatten());

        if let Some(settings) = stored.as_deref().and_then(Self::from_json) {
            log::info!("Loaded settings from LocalStorage");
            return settings;
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
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save settings");
                }
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
    fn test_reduced_motion_hides_flash() {
        let mut settings = Settings::default();
        assert!(settings.effective_level_flash());
        settings.reduced_motion = true;
        assert!(!settings.effective_level_flash());
    }

    #[test]
    fn test_toggle_mute() {
        let mut settings = Settings::default();
        assert!(settings.toggle_mute());
        assert!(!settings.toggle_mute());
    }

    #[test]
    fn test_from_json_partial_and_clamped() {
        let settings = Settings::from_json(r#"{"muted":true,"master_volume":4.0}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 1.0);
        assert!(settings.level_flash);

        assert!(Settings::from_json("not json").is_none());
    }

    #[test]
    fn test_storage_round_trip() {
        let settings = Settings {
            muted: true,
            master_volume: 0.25,
            level_flash: false,
            reduced_motion: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json), Some(settings));
    }
}
