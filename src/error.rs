//! Unified error type hierarchy for Device Inspector
//!
//! Provides structured error handling with HardwareError, EngineError, HistoryError,
//! ExportError, ConfigError, and the UI-facing AppError.

use crate::models::DiagnosticKind;
use std::io;
use thiserror::Error;

/// Hardware facts could not be read (data-unavailable).
#[derive(Error, Debug, Clone)]
pub enum HardwareError {
    #[error("Hardware data unavailable: {0}")]
    Unavailable(String),

    #[error("Hardware data invalid: {0}")]
    Invalid(String),
}

/// Engine run failures.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    #[error("A {0} run is already in progress")]
    AlreadyRunning(DiagnosticKind),

    #[error("Diagnostic worker failed: {0}")]
    Join(String),
}

/// History persistence errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error during history operations: {0}")]
    Io(#[from] io::Error),

    #[error("History serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History for {kind} is corrupt: {reason}")]
    Corrupt { kind: DiagnosticKind, reason: String },
}

/// Export rendering and writing errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error during export: {0}")]
    Io(#[from] io::Error),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(String),

    #[error("QR payload of {len} bytes exceeds capacity of {capacity} bytes")]
    CapacityExceeded { len: usize, capacity: usize },
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Encoding(e.to_string())
    }
}

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Global error type surfaced across the UI boundary
///
/// Every failure family collapses into one of these categories so callers
/// can show a short message without matching on module-specific enums.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// A diagnostic run failed as a whole
    #[error("Diagnostic run failed: {0}")]
    Run(String),

    /// A run of the same kind is still in flight
    #[error("Diagnostic busy: {0}")]
    Busy(String),

    /// History read or write failed
    #[error("History error: {0}")]
    History(String),

    /// Export rendering or writing failed
    #[error("Export error: {0}")]
    Export(String),

    /// QR payload did not fit
    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    /// Settings persist or deserialize error
    #[error("Settings error: {0}")]
    Settings(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Get a user-facing error message suitable for UI display
    pub fn user_message(&self) -> String {
        match self {
            AppError::Run(msg) => format!("The diagnostic could not be completed: {}", msg),
            AppError::Busy(msg) => format!("Please wait, {}", msg),
            AppError::History(msg) => format!("Could not access saved results: {}", msg),
            AppError::Export(msg) => format!("Export failed: {}", msg),
            AppError::Capacity(msg) => format!("Report too large for a QR code: {}", msg),
            AppError::Settings(msg) => format!("Settings error: {}", msg),
            AppError::Io(msg) => format!("File operation failed: {}", msg),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::AlreadyRunning(_) => AppError::Busy(e.to_string()),
            other => AppError::Run(other.to_string()),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        AppError::History(e.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::CapacityExceeded { .. } => AppError::Capacity(e.to_string()),
            other => AppError::Export(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Settings(e.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

/// Top-level result type for operations that may fail.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_error_display() {
        let err = HardwareError::Unavailable("battery".to_string());
        assert_eq!(err.to_string(), "Hardware data unavailable: battery");
    }

    #[test]
    fn test_already_running_maps_to_busy() {
        let err: AppError = EngineError::AlreadyRunning(DiagnosticKind::HealthCheck).into();
        assert!(matches!(err, AppError::Busy(_)));
        assert!(err.user_message().starts_with("Please wait"));
    }

    #[test]
    fn test_capacity_exceeded_is_distinct() {
        let err: AppError = ExportError::CapacityExceeded {
            len: 4000,
            capacity: 1273,
        }
        .into();
        assert!(matches!(err, AppError::Capacity(_)));
        assert!(err.to_string().contains("4000"));
    }

    #[test]
    fn test_export_io_maps_to_export() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = ExportError::from(io_err).into();
        assert!(matches!(err, AppError::Export(_)));
    }
}
