//! Device Inspector core
//!
//! Runs simulated device diagnostics, grades them and renders the results
//! into shareable reports.
//!
//! The crate is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **grading**: Score-to-status and score-to-grade tables
//! - **models**: Result records shared by engines, history and exporters
//! - **hardware**: Source of device facts the engines read
//! - **random**: Injectable value sources for simulated measurements
//! - **engine**: Health check, benchmark and comparison engines plus the run service
//! - **history**: Bounded per-kind result history on disk
//! - **report**: Flattening of results into labelled report rows
//! - **export**: Text, JSON, PDF, spreadsheet and QR renderers and sinks
//! - **config**: Settings load/save and validation

// Core foundational modules
pub mod error;
pub mod grading;
pub mod models;

pub mod hardware;
pub mod random;

pub mod engine;
pub mod history;

pub mod report;
pub mod export;

pub mod config;

// Decoupled logging backend
pub mod log_collector;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{
    AppError, ConfigError, EngineError, ExportError, HardwareError, HistoryError, Result,
};

pub use grading::{HealthStatus, PerformanceGrade};

pub use models::{
    BenchmarkCategory, BenchmarkResult, CategoryScore, ComparisonCategory, ComparisonResult,
    DeviceComparison, DeviceMetrics, DeviceProfile, DeviceRanking, DeviceSpecifications,
    DiagnosticKind, DiagnosticResult, HealthCategory, HealthCheck, HealthCheckResult,
    HealthCheckSummary, OverallComparison, PerformanceScore, SimilarDevice,
};

pub use hardware::{HardwareFacts, StaticHardwareFacts};
pub use random::{ScriptedValueSource, SeededValueSource, ValueSource};

pub use engine::{BenchmarkEngine, ComparisonEngine, DiagnosticsService, HealthCheckEngine};
pub use history::{HistoryStore, MAX_HISTORY_ENTRIES};

pub use report::{Report, ReportFormatter, ReportRow};
pub use export::{
    ExportFormat, ExportOptions, ExportOutcome, ExportRequest, ExportSink, Exporter, FileSink,
    MemorySink,
};

pub use config::{DiagnosticsSettings, SettingsManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
    }

    #[test]
    fn test_enum_variants_accessible() {
        assert_eq!(HealthStatus::from_score(95), HealthStatus::Excellent);
        assert_eq!(DiagnosticKind::ALL.len(), 3);
        assert_eq!(ExportFormat::ALL.len(), 5);
    }
}
