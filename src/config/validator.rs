//! Settings validation.

use super::DiagnosticsSettings;
use crate::error::ConfigError;

/// Smallest QR image that still scans reliably
pub const MIN_QR_IMAGE_SIZE: u32 = 64;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

pub fn validate_settings(settings: &DiagnosticsSettings) -> Result<(), ConfigError> {
    if settings.qr_image_size < MIN_QR_IMAGE_SIZE {
        return Err(ConfigError::ValidationFailed(format!(
            "qr_image_size must be at least {} px, got {}",
            MIN_QR_IMAGE_SIZE, settings.qr_image_size
        )));
    }

    if settings.qr_max_payload_bytes == 0 {
        return Err(ConfigError::ValidationFailed(
            "qr_max_payload_bytes must be positive".to_string(),
        ));
    }

    if settings.population_size == Some(0) {
        return Err(ConfigError::ValidationFailed(
            "population_size must be at least 1".to_string(),
        ));
    }

    let level = settings.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::ValidationFailed(format!(
            "Unknown log level '{}'",
            settings.log_level
        )));
    }

    for (name, dir) in [
        ("history_dir", &settings.history_dir),
        ("export_dir", &settings.export_dir),
        ("log_dir", &settings.log_dir),
    ] {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
