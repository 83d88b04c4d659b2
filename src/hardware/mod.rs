//! Hardware facts provider seam.
//!
//! Engines never read the platform directly. They receive a `HardwareFacts`
//! implementation and treat every read as fallible: a failed read degrades the
//! affected check to a sentinel value instead of aborting the run.

pub mod snapshot;

pub use snapshot::{
    BatterySnapshot, CameraSnapshot, CpuSnapshot, DeviceIdentity, DisplaySnapshot, GpuSnapshot,
    MemorySnapshot, NetworkSnapshot, NetworkType, StorageSnapshot,
};

use crate::error::HardwareError;

/// Read-only snapshot provider for every hardware component the core consumes.
pub trait HardwareFacts: Send + Sync {
    fn device(&self) -> Result<DeviceIdentity, HardwareError>;
    fn cpu(&self) -> Result<CpuSnapshot, HardwareError>;
    fn gpu(&self) -> Result<GpuSnapshot, HardwareError>;
    fn memory(&self) -> Result<MemorySnapshot, HardwareError>;
    fn storage(&self) -> Result<StorageSnapshot, HardwareError>;
    fn network(&self) -> Result<NetworkSnapshot, HardwareError>;
    fn battery(&self) -> Result<BatterySnapshot, HardwareError>;
    fn display(&self) -> Result<DisplaySnapshot, HardwareError>;
    fn camera(&self) -> Result<CameraSnapshot, HardwareError>;
}

/// In-memory provider. A `None` field reads as unavailable.
#[derive(Debug, Clone, Default)]
pub struct StaticHardwareFacts {
    pub device: Option<DeviceIdentity>,
    pub cpu: Option<CpuSnapshot>,
    pub gpu: Option<GpuSnapshot>,
    pub memory: Option<MemorySnapshot>,
    pub storage: Option<StorageSnapshot>,
    pub network: Option<NetworkSnapshot>,
    pub battery: Option<BatterySnapshot>,
    pub display: Option<DisplaySnapshot>,
    pub camera: Option<CameraSnapshot>,
}

fn read<T: Clone>(value: &Option<T>, component: &str) -> Result<T, HardwareError> {
    value
        .clone()
        .ok_or_else(|| HardwareError::Unavailable(format!("{} information not reported", component)))
}

impl HardwareFacts for StaticHardwareFacts {
    fn device(&self) -> Result<DeviceIdentity, HardwareError> {
        read(&self.device, "device")
    }

    fn cpu(&self) -> Result<CpuSnapshot, HardwareError> {
        read(&self.cpu, "CPU")
    }

    fn gpu(&self) -> Result<GpuSnapshot, HardwareError> {
        read(&self.gpu, "GPU")
    }

    fn memory(&self) -> Result<MemorySnapshot, HardwareError> {
        read(&self.memory, "memory")
    }

    fn storage(&self) -> Result<StorageSnapshot, HardwareError> {
        read(&self.storage, "storage")
    }

    fn network(&self) -> Result<NetworkSnapshot, HardwareError> {
        read(&self.network, "network")
    }

    fn battery(&self) -> Result<BatterySnapshot, HardwareError> {
        read(&self.battery, "battery")
    }

    fn display(&self) -> Result<DisplaySnapshot, HardwareError> {
        read(&self.display, "display")
    }

    fn camera(&self) -> Result<CameraSnapshot, HardwareError> {
        read(&self.camera, "camera")
    }
}

const GIB: u64 = 1024 * 1024 * 1024;

impl StaticHardwareFacts {
    /// A mid-range handset with every component reported.
    pub fn demo() -> Self {
        StaticHardwareFacts {
            device: Some(DeviceIdentity {
                device_name: "Pixel 7a".to_string(),
                manufacturer: "Google".to_string(),
                model: "G82U8".to_string(),
                os_version_label: "Android 14".to_string(),
                os_major_version: 14,
                security_patch_age_days: Some(45),
            }),
            cpu: Some(CpuSnapshot {
                model: "Google Tensor G2".to_string(),
                core_count: 8,
                min_freq_mhz: vec![300; 8],
                max_freq_mhz: vec![1803, 1803, 1803, 1803, 2348, 2348, 2850, 2850],
            }),
            gpu: Some(GpuSnapshot {
                vendor: "ARM".to_string(),
                model: "Mali-G710 MP7".to_string(),
                load_percent: Some(12),
            }),
            memory: Some(MemorySnapshot {
                total_bytes: 8 * GIB,
                available_bytes: 3 * GIB,
            }),
            storage: Some(StorageSnapshot {
                total_bytes: 128 * GIB,
                available_bytes: 71 * GIB,
            }),
            network: Some(NetworkSnapshot {
                network_type: NetworkType::Wifi,
                operator: Some("HomeNet".to_string()),
                connected: true,
            }),
            battery: Some(BatterySnapshot {
                level_percent: 76,
                status: "Discharging".to_string(),
                health: "Good".to_string(),
                temperature_c: 31.5,
                voltage_mv: 4012,
                design_capacity_mah: Some(4385),
            }),
            display: Some(DisplaySnapshot {
                width_px: 1080,
                height_px: 2400,
                density_ppi: 429,
                refresh_rate_hz: 90,
            }),
            camera: Some(CameraSnapshot {
                main_megapixels: 64.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_component_is_unavailable() {
        let facts = StaticHardwareFacts::default();
        let err = facts.battery().unwrap_err();
        assert!(matches!(err, HardwareError::Unavailable(_)));
        assert!(err.to_string().contains("battery"));
    }

    #[test]
    fn test_demo_reports_everything() {
        let facts = StaticHardwareFacts::demo();
        assert!(facts.device().is_ok());
        assert!(facts.cpu().is_ok());
        assert!(facts.gpu().is_ok());
        assert!(facts.memory().is_ok());
        assert!(facts.storage().is_ok());
        assert!(facts.network().is_ok());
        assert!(facts.battery().is_ok());
        assert!(facts.display().is_ok());
        assert!(facts.camera().is_ok());
    }
}
