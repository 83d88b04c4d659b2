//! Read-only hardware value objects.
//!
//! These are handed to the engines already parsed; nothing here probes the
//! platform.

use serde::{Deserialize, Serialize};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_name: String,
    pub manufacturer: String,
    pub model: String,
    /// e.g. "Android 14"
    pub os_version_label: String,
    pub os_major_version: u32,
    /// Days since the installed security patch level
    pub security_patch_age_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub model: String,
    pub core_count: u32,
    pub min_freq_mhz: Vec<u32>,
    pub max_freq_mhz: Vec<u32>,
}

impl CpuSnapshot {
    /// Highest per-core max clock, 0 when unknown
    pub fn peak_mhz(&self) -> u32 {
        self.max_freq_mhz.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSnapshot {
    pub vendor: String,
    pub model: String,
    pub load_percent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemorySnapshot {
    pub fn free_percent(&self) -> f64 {
        percent(self.available_bytes, self.total_bytes)
    }

    pub fn total_gb(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_GB
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl StorageSnapshot {
    pub fn free_percent(&self) -> f64 {
        percent(self.available_bytes, self.total_bytes)
    }

    pub fn total_gb(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_GB
    }

    pub fn available_gb(&self) -> f64 {
        self.available_bytes as f64 / BYTES_PER_GB
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    Wifi,
    Cellular,
    Ethernet,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub network_type: NetworkType,
    /// Carrier name or SSID
    pub operator: Option<String>,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySnapshot {
    pub level_percent: u32,
    pub status: String,
    pub health: String,
    pub temperature_c: f32,
    pub voltage_mv: u32,
    pub design_capacity_mah: Option<u32>,
}

impl BatterySnapshot {
    pub fn is_healthy(&self) -> bool {
        self.health.eq_ignore_ascii_case("good")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub width_px: u32,
    pub height_px: u32,
    pub density_ppi: u32,
    pub refresh_rate_hz: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub main_megapixels: f64,
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
