//! Core data types for Device Inspector.
//!
//! Result types are plain values: engines build them once and hand them out.
//! Status and grade are always derived from a score through the constructors
//! here, never set independently.

use crate::grading::{clamp_score, HealthStatus, PerformanceGrade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three independent diagnostic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    HealthCheck,
    Performance,
    Comparison,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 3] = [
        DiagnosticKind::HealthCheck,
        DiagnosticKind::Performance,
        DiagnosticKind::Comparison,
    ];

    /// Stable identifier used for file names
    pub fn slug(&self) -> &'static str {
        match self {
            DiagnosticKind::HealthCheck => "health_check",
            DiagnosticKind::Performance => "performance",
            DiagnosticKind::Comparison => "comparison",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DiagnosticKind::HealthCheck => 0,
            DiagnosticKind::Performance => 1,
            DiagnosticKind::Comparison => 2,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::HealthCheck => write!(f, "health check"),
            DiagnosticKind::Performance => write!(f, "performance benchmark"),
            DiagnosticKind::Comparison => write!(f, "device comparison"),
        }
    }
}

// ============================================================================
// HEALTH CHECK
// ============================================================================

/// Health check categories, declared in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthCategory {
    Performance,
    Storage,
    Battery,
    Temperature,
    Memory,
    Network,
    Security,
    System,
}

impl HealthCategory {
    /// Fixed run order
    pub const ALL: [HealthCategory; 8] = [
        HealthCategory::Performance,
        HealthCategory::Storage,
        HealthCategory::Battery,
        HealthCategory::Temperature,
        HealthCategory::Memory,
        HealthCategory::Network,
        HealthCategory::Security,
        HealthCategory::System,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthCategory::Performance => "Performance",
            HealthCategory::Storage => "Storage",
            HealthCategory::Battery => "Battery",
            HealthCategory::Temperature => "Temperature",
            HealthCategory::Memory => "Memory",
            HealthCategory::Network => "Network",
            HealthCategory::Security => "Security",
            HealthCategory::System => "System",
        }
    }
}

/// A single category check from one health run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub category: HealthCategory,
    pub name: String,
    pub score: i32,
    pub status: HealthStatus,
    pub description: String,
    pub recommendation: Option<String>,
}

impl HealthCheck {
    pub fn new(
        category: HealthCategory,
        score: i32,
        description: impl Into<String>,
        recommendation: Option<String>,
    ) -> Self {
        let score = clamp_score(score);
        HealthCheck {
            category,
            name: category.label().to_string(),
            score,
            status: HealthStatus::from_score(score),
            description: description.into(),
            recommendation,
        }
    }
}

/// Aggregated outcome of one health run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub overall_score: i32,
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Compact projection of a health run, stored in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckSummary {
    pub timestamp: DateTime<Utc>,
    pub overall_score: i32,
    pub overall_status: HealthStatus,
    pub device_name: String,
    pub android_version_label: String,
}

impl HealthCheckSummary {
    pub fn from_result(
        result: &HealthCheckResult,
        device_name: impl Into<String>,
        android_version_label: impl Into<String>,
    ) -> Self {
        HealthCheckSummary {
            timestamp: result.timestamp,
            overall_score: result.overall_score,
            overall_status: HealthStatus::from_score(result.overall_score),
            device_name: device_name.into(),
            android_version_label: android_version_label.into(),
        }
    }
}

// ============================================================================
// BENCHMARK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BenchmarkCategory {
    Cpu,
    Gpu,
    Ram,
    Storage,
    Network,
    Battery,
    Thermal,
}

impl BenchmarkCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BenchmarkCategory::Cpu => "CPU",
            BenchmarkCategory::Gpu => "GPU",
            BenchmarkCategory::Ram => "RAM",
            BenchmarkCategory::Storage => "Storage",
            BenchmarkCategory::Network => "Network",
            BenchmarkCategory::Battery => "Battery",
            BenchmarkCategory::Thermal => "Thermal",
        }
    }
}

/// One measured sub-benchmark. `score` is unit-specific and unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub test_name: String,
    pub category: BenchmarkCategory,
    pub score: f64,
    pub unit: String,
    pub description: String,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: BenchmarkCategory,
    pub score: i32,
    pub grade: PerformanceGrade,
    pub details: String,
    pub sub_results: Vec<BenchmarkResult>,
}

impl CategoryScore {
    pub fn new(
        category: BenchmarkCategory,
        score: i32,
        details: impl Into<String>,
        sub_results: Vec<BenchmarkResult>,
    ) -> Self {
        let score = clamp_score(score);
        CategoryScore {
            category,
            score,
            grade: PerformanceGrade::from_score(score),
            details: details.into(),
            sub_results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDevice {
    pub name: String,
    pub score: i32,
    pub score_delta: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRanking {
    pub global_rank: u32,
    pub total_devices: u32,
    /// The overall score doubles as the percentile proxy
    pub percentile: i32,
    pub similar_devices: Vec<SimilarDevice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    pub overall_score: i32,
    pub grade: PerformanceGrade,
    pub category_scores: Vec<CategoryScore>,
    pub benchmark_results: Vec<BenchmarkResult>,
    pub device_ranking: Option<DeviceRanking>,
    pub last_test_time: DateTime<Utc>,
}

impl PerformanceScore {
    /// Score of one category, if it was benchmarked
    pub fn category_score(&self, category: BenchmarkCategory) -> Option<i32> {
        self.category_scores
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.score)
    }
}

// ============================================================================
// COMPARISON
// ============================================================================

/// Human-readable specification strings shown for each profile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSpecifications {
    pub cpu: String,
    pub ram: String,
    pub storage: String,
    pub display: String,
    pub battery: String,
}

/// Numeric metric per comparison axis. Zero marks an unavailable reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceMetrics {
    pub cpu_cores: f64,
    pub cpu_max_mhz: f64,
    pub gpu_score: f64,
    pub ram_gb: f64,
    pub storage_gb: f64,
    pub display_ppi: f64,
    pub refresh_rate_hz: f64,
    pub battery_mah: f64,
    pub camera_mp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub device_name: String,
    pub manufacturer: String,
    pub model: String,
    pub specifications: DeviceSpecifications,
    pub performance_score: i32,
    pub is_current_device: bool,
    pub metrics: DeviceMetrics,
}

impl DeviceProfile {
    /// Metric value of this profile on one comparison axis
    pub fn metric(&self, category: ComparisonCategory) -> f64 {
        let m = &self.metrics;
        match category {
            ComparisonCategory::OverallPerformance => self.performance_score as f64,
            ComparisonCategory::CpuCores => m.cpu_cores,
            ComparisonCategory::CpuFrequency => m.cpu_max_mhz,
            ComparisonCategory::GpuPerformance => m.gpu_score,
            ComparisonCategory::RamCapacity => m.ram_gb,
            ComparisonCategory::StorageCapacity => m.storage_gb,
            ComparisonCategory::DisplayDensity => m.display_ppi,
            ComparisonCategory::RefreshRate => m.refresh_rate_hz,
            ComparisonCategory::BatteryCapacity => m.battery_mah,
            ComparisonCategory::CameraResolution => m.camera_mp,
        }
    }
}

/// The ten comparison axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonCategory {
    OverallPerformance,
    CpuCores,
    CpuFrequency,
    GpuPerformance,
    RamCapacity,
    StorageCapacity,
    DisplayDensity,
    RefreshRate,
    BatteryCapacity,
    CameraResolution,
}

impl ComparisonCategory {
    pub const ALL: [ComparisonCategory; 10] = [
        ComparisonCategory::OverallPerformance,
        ComparisonCategory::CpuCores,
        ComparisonCategory::CpuFrequency,
        ComparisonCategory::GpuPerformance,
        ComparisonCategory::RamCapacity,
        ComparisonCategory::StorageCapacity,
        ComparisonCategory::DisplayDensity,
        ComparisonCategory::RefreshRate,
        ComparisonCategory::BatteryCapacity,
        ComparisonCategory::CameraResolution,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComparisonCategory::OverallPerformance => "Overall Performance",
            ComparisonCategory::CpuCores => "CPU Cores",
            ComparisonCategory::CpuFrequency => "CPU Frequency",
            ComparisonCategory::GpuPerformance => "GPU Performance",
            ComparisonCategory::RamCapacity => "RAM Capacity",
            ComparisonCategory::StorageCapacity => "Storage Capacity",
            ComparisonCategory::DisplayDensity => "Display Density",
            ComparisonCategory::RefreshRate => "Refresh Rate",
            ComparisonCategory::BatteryCapacity => "Battery Capacity",
            ComparisonCategory::CameraResolution => "Camera Resolution",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ComparisonCategory::OverallPerformance | ComparisonCategory::GpuPerformance => "pts",
            ComparisonCategory::CpuCores => "cores",
            ComparisonCategory::CpuFrequency => "MHz",
            ComparisonCategory::RamCapacity | ComparisonCategory::StorageCapacity => "GB",
            ComparisonCategory::DisplayDensity => "ppi",
            ComparisonCategory::RefreshRate => "Hz",
            ComparisonCategory::BatteryCapacity => "mAh",
            ComparisonCategory::CameraResolution => "MP",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComparisonCategory::OverallPerformance => "Combined benchmark score",
            ComparisonCategory::CpuCores => "Number of processor cores",
            ComparisonCategory::CpuFrequency => "Peak processor clock speed",
            ComparisonCategory::GpuPerformance => "Graphics benchmark score",
            ComparisonCategory::RamCapacity => "Installed memory",
            ComparisonCategory::StorageCapacity => "Internal storage size",
            ComparisonCategory::DisplayDensity => "Screen pixel density",
            ComparisonCategory::RefreshRate => "Maximum display refresh rate",
            ComparisonCategory::BatteryCapacity => "Battery design capacity",
            ComparisonCategory::CameraResolution => "Main camera sensor resolution",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub category: ComparisonCategory,
    pub current_score: f64,
    pub average_score: f64,
    pub best_score: f64,
    pub worst_score: f64,
    /// 1-based position of the current device, ties resolved to the first slot
    pub ranking: u32,
    pub total_devices: u32,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallComparison {
    pub overall_ranking: u32,
    pub total_devices: u32,
    pub percentile: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceComparison {
    pub current_device: DeviceProfile,
    pub compared_devices: Vec<DeviceProfile>,
    pub comparison_results: Vec<ComparisonResult>,
    pub overall_comparison: OverallComparison,
    pub last_update_time: DateTime<Utc>,
}

// ============================================================================
// TAGGED UNION
// ============================================================================

/// Any diagnostic result, as consumed by the report formatter and exporters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum DiagnosticResult {
    HealthCheck(HealthCheckResult),
    Performance(PerformanceScore),
    Comparison(DeviceComparison),
}

impl DiagnosticResult {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            DiagnosticResult::HealthCheck(_) => DiagnosticKind::HealthCheck,
            DiagnosticResult::Performance(_) => DiagnosticKind::Performance,
            DiagnosticResult::Comparison(_) => DiagnosticKind::Comparison,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DiagnosticResult::HealthCheck(r) => r.timestamp,
            DiagnosticResult::Performance(r) => r.last_test_time,
            DiagnosticResult::Comparison(r) => r.last_update_time,
        }
    }
}

impl From<HealthCheckResult> for DiagnosticResult {
    fn from(r: HealthCheckResult) -> Self {
        DiagnosticResult::HealthCheck(r)
    }
}

impl From<PerformanceScore> for DiagnosticResult {
    fn from(r: PerformanceScore) -> Self {
        DiagnosticResult::Performance(r)
    }
}

impl From<DeviceComparison> for DiagnosticResult {
    fn from(r: DeviceComparison) -> Self {
        DiagnosticResult::Comparison(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_derives_status_and_clamps() {
        let check = HealthCheck::new(HealthCategory::Storage, 140, "plenty", None);
        assert_eq!(check.score, 100);
        assert_eq!(check.status, HealthStatus::Excellent);
        assert_eq!(check.name, "Storage");
    }

    #[test]
    fn test_category_order_is_fixed() {
        assert_eq!(HealthCategory::ALL[0], HealthCategory::Performance);
        assert_eq!(HealthCategory::ALL[7], HealthCategory::System);
        assert_eq!(HealthCategory::Memory.index(), 4);
    }

    #[test]
    fn test_category_score_grade() {
        let score = CategoryScore::new(BenchmarkCategory::Gpu, 86, "", vec![]);
        assert_eq!(score.grade, PerformanceGrade::APlus);
    }

    #[test]
    fn test_diagnostic_kind_slug() {
        assert_eq!(DiagnosticKind::HealthCheck.slug(), "health_check");
        assert_eq!(DiagnosticKind::Comparison.index(), 2);
    }
}
