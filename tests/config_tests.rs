//! Settings flowing from disk into the service and exporters
//!
//! - loader: JSON load/save and path checks
//! - validator: rejected values never reach a run
//! - SettingsManager: defaults for a missing file

use device_inspector::config::{loader, validator};
use device_inspector::{
    ConfigError, DiagnosticKind, DiagnosticsSettings, ExportOptions, SettingsManager,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_settings_drive_export_options() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    let mut settings = DiagnosticsSettings::rooted_at(temp_dir.path());
    settings.qr_image_size = 300;
    settings.qr_max_payload_bytes = 900;
    SettingsManager::save(&settings, &path).unwrap();

    let loaded = SettingsManager::load(&path).unwrap();
    let options = ExportOptions::from_settings(&loaded);
    assert_eq!(options.qr_image_size, 300);
    assert_eq!(options.qr_max_payload_bytes, 900);
}

#[test]
fn test_wrong_extension_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    assert!(matches!(
        loader::save_settings_to_file(&DiagnosticsSettings::default(), &path),
        Err(ConfigError::ValidationFailed(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_malformed_json_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        SettingsManager::load(&path),
        Err(ConfigError::InvalidJson(_))
    ));
}

#[test]
fn test_zero_population_rejected() {
    let mut settings = DiagnosticsSettings::default();
    settings.population_size = Some(0);
    assert!(validator::validate_settings(&settings).is_err());

    settings.population_size = Some(1);
    assert!(validator::validate_settings(&settings).is_ok());
}

#[tokio::test]
async fn test_service_uses_configured_history_dir() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = DiagnosticsSettings::rooted_at(temp_dir.path());
    settings.rng_seed = Some(1);
    let history_dir = settings.history_dir.clone();

    let service = device_inspector::DiagnosticsService::new(
        std::sync::Arc::new(device_inspector::StaticHardwareFacts::demo()),
        settings,
    );
    service.run_health().await.unwrap();

    assert!(history_dir.join("health_check_history.json").exists());
    assert_eq!(service.history().len(DiagnosticKind::HealthCheck).unwrap(), 1);
}
