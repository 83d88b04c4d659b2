//! Configuration module for diagnostics runs.
//!
//! # Module Structure
//!
//! - `loader`: settings paths, JSON load/save
//! - `validator`: range and consistency checks on loaded settings
//!
//! Missing files fall back to defaults; a file that exists but fails to parse
//! or validate is an error, since silently ignoring it would hide a typo.

pub mod loader;
pub mod validator;

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "device-inspector";

/// Persisted diagnostics settings
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    // Storage
    pub history_dir: PathBuf,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,

    /// One of error, warn, info, debug, trace
    pub log_level: String,

    // Simulation
    /// Fixed seed for reproducible runs; entropy when unset
    pub rng_seed: Option<u64>,
    /// Fixed ranking population; simulated per run when unset
    pub population_size: Option<u32>,
    pub step_delay_ms: u64,

    // QR export
    pub qr_image_size: u32,
    pub qr_max_payload_bytes: usize,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        let base = default_base_dir();
        DiagnosticsSettings {
            history_dir: base.join("history"),
            export_dir: base.join("exports"),
            log_dir: base.join("logs"),
            log_level: "info".to_string(),
            rng_seed: None,
            population_size: None,
            step_delay_ms: 0,
            qr_image_size: 512,
            qr_max_payload_bytes: 1273,
        }
    }
}

impl DiagnosticsSettings {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Point every directory under `root`
    pub fn rooted_at(root: &Path) -> Self {
        DiagnosticsSettings {
            history_dir: root.join("history"),
            export_dir: root.join("exports"),
            log_dir: root.join("logs"),
            ..Default::default()
        }
    }
}

/// `<config dir>/device-inspector`, or a relative fallback when the platform
/// has no config directory
fn default_base_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(APP_DIR))
}

/// Settings persistence
pub struct SettingsManager;

impl SettingsManager {
    /// Load settings from `path`, or defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<DiagnosticsSettings, ConfigError> {
        match loader::load_settings_from_file(path) {
            Ok(settings) => {
                validator::validate_settings(&settings)?;
                log::info!("[Config] Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(ConfigError::FileNotFound(_)) => {
                log::info!(
                    "[Config] No settings at {}, using defaults",
                    path.display()
                );
                Ok(DiagnosticsSettings::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Load from the default settings location
    pub fn load_default() -> Result<DiagnosticsSettings, ConfigError> {
        Self::load(&loader::default_settings_path())
    }

    pub fn save(settings: &DiagnosticsSettings, path: &Path) -> Result<(), ConfigError> {
        validator::validate_settings(settings)?;
        loader::save_settings_to_file(settings, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = DiagnosticsSettings::default();
        assert_eq!(settings.qr_image_size, 512);
        assert_eq!(settings.qr_max_payload_bytes, 1273);
        assert_eq!(settings.rng_seed, None);
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Info);
        assert!(settings.history_dir.ends_with("history"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = SettingsManager::load(&temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, DiagnosticsSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/settings.json");
        let mut settings = DiagnosticsSettings::rooted_at(temp_dir.path());
        settings.rng_seed = Some(42);
        settings.population_size = Some(75_000);

        SettingsManager::save(&settings, &path).unwrap();
        let loaded = SettingsManager::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "rng_seed": 7 }"#).unwrap();
        let loaded = SettingsManager::load(&path).unwrap();
        assert_eq!(loaded.rng_seed, Some(7));
        assert_eq!(loaded.qr_image_size, 512);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "qr_image_size": 8 }"#).unwrap();
        assert!(matches!(
            SettingsManager::load(&path),
            Err(ConfigError::ValidationFailed(_))
        ));
    }
}
