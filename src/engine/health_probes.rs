//! Default health probes, one per category.
//!
//! Each probe picks a score band from the hardware reading and draws the
//! exact score inside that band from the injected value source. Probes always
//! carry advice text; the engine decides whether it surfaces.

use crate::error::HardwareError;
use crate::hardware::{HardwareFacts, NetworkType};
use crate::models::HealthCategory;
use crate::random::ValueSource;

/// What a single probe reports before status is derived
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub score: i32,
    pub description: String,
    pub recommendation: Option<String>,
}

impl ProbeOutcome {
    pub fn new(score: i32, description: impl Into<String>, recommendation: &str) -> Self {
        ProbeOutcome {
            score,
            description: description.into(),
            recommendation: Some(recommendation.to_string()),
        }
    }
}

/// A pluggable category check.
pub trait HealthProbe: Send + Sync {
    fn category(&self) -> HealthCategory;

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError>;
}

/// Probes for all eight categories, in run order
pub fn default_probes() -> Vec<Box<dyn HealthProbe>> {
    vec![
        Box::new(PerformanceProbe),
        Box::new(StorageProbe),
        Box::new(BatteryProbe),
        Box::new(TemperatureProbe),
        Box::new(MemoryProbe),
        Box::new(NetworkProbe),
        Box::new(SecurityProbe),
        Box::new(SystemProbe),
    ]
}

pub struct PerformanceProbe;

impl HealthProbe for PerformanceProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Performance
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let cpu = facts.cpu()?;
        if cpu.core_count == 0 {
            return Err(HardwareError::Invalid("CPU reports zero cores".to_string()));
        }
        let (min, max) = match cpu.core_count {
            8.. => (80, 100),
            6..=7 => (70, 89),
            4..=5 => (60, 79),
            _ => (40, 59),
        };
        let score = values.next_in_range(min, max);
        Ok(ProbeOutcome::new(
            score,
            format!(
                "{} cores on {}, peak {} MHz",
                cpu.core_count,
                cpu.model,
                cpu.peak_mhz()
            ),
            "Close background apps to free up processing power",
        ))
    }
}

pub struct StorageProbe;

impl HealthProbe for StorageProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Storage
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let storage = facts.storage()?;
        let free = storage.free_percent();
        let score = if free > 50.0 {
            values.next_in_range(85, 100)
        } else if free > 20.0 {
            values.next_in_range(60, 84)
        } else {
            values.next_in_range(30, 59)
        };
        Ok(ProbeOutcome::new(
            score,
            format!(
                "{:.0}% free ({:.1} GB of {:.1} GB)",
                free,
                storage.available_gb(),
                storage.total_gb()
            ),
            "Free up storage space by removing unused apps and files",
        ))
    }
}

pub struct BatteryProbe;

impl HealthProbe for BatteryProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Battery
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let battery = facts.battery()?;
        let description = format!(
            "{}% charged, health {}, {}",
            battery.level_percent, battery.health, battery.status
        );
        if !battery.is_healthy() {
            let score = values.next_in_range(30, 59);
            return Ok(ProbeOutcome::new(
                score,
                description,
                "Battery health is degraded; consider a battery replacement",
            ));
        }
        let score = match battery.level_percent {
            50.. => values.next_in_range(85, 100),
            20..=49 => values.next_in_range(65, 84),
            _ => values.next_in_range(40, 64),
        };
        Ok(ProbeOutcome::new(
            score,
            description,
            "Charge your device and avoid frequent deep discharges",
        ))
    }
}

pub struct TemperatureProbe;

impl HealthProbe for TemperatureProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Temperature
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let battery = facts.battery()?;
        let temp = battery.temperature_c;
        if !temp.is_finite() {
            return Err(HardwareError::Invalid(format!("temperature reading {}", temp)));
        }
        let score = if temp < 35.0 {
            values.next_in_range(90, 100)
        } else if temp < 40.0 {
            values.next_in_range(75, 89)
        } else if temp < 45.0 {
            values.next_in_range(55, 74)
        } else {
            values.next_in_range(30, 54)
        };
        Ok(ProbeOutcome::new(
            score,
            format!("Battery temperature {:.1}°C", temp),
            "Let the device cool down and avoid heavy use while charging",
        ))
    }
}

pub struct MemoryProbe;

impl HealthProbe for MemoryProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Memory
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let memory = facts.memory()?;
        let free = memory.free_percent();
        let score = if free > 50.0 {
            values.next_in_range(85, 100)
        } else if free > 25.0 {
            values.next_in_range(65, 84)
        } else {
            values.next_in_range(35, 64)
        };
        Ok(ProbeOutcome::new(
            score,
            format!("{:.0}% of {:.1} GB RAM available", free, memory.total_gb()),
            "Close unused apps to free memory",
        ))
    }
}

pub struct NetworkProbe;

impl HealthProbe for NetworkProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Network
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let network = facts.network()?;
        let operator = network.operator.clone().unwrap_or_else(|| "unknown".to_string());
        let (score, description) = match (network.connected, network.network_type) {
            (false, _) | (_, NetworkType::None) => {
                (values.next_in_range(20, 40), "No active connection".to_string())
            }
            (true, NetworkType::Wifi) => (
                values.next_in_range(85, 100),
                format!("Connected over Wi-Fi ({})", operator),
            ),
            (true, NetworkType::Ethernet) => (
                values.next_in_range(85, 100),
                "Connected over Ethernet".to_string(),
            ),
            (true, NetworkType::Cellular) => (
                values.next_in_range(70, 90),
                format!("Connected over cellular ({})", operator),
            ),
        };
        Ok(ProbeOutcome::new(
            score,
            description,
            "Check your network connection or move closer to the access point",
        ))
    }
}

pub struct SecurityProbe;

impl HealthProbe for SecurityProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::Security
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let device = facts.device()?;
        let (score, description) = match device.security_patch_age_days {
            Some(age @ 0..=90) => (
                values.next_in_range(85, 100),
                format!("Security patch is {} days old", age),
            ),
            Some(age @ 91..=180) => (
                values.next_in_range(65, 84),
                format!("Security patch is {} days old", age),
            ),
            Some(age) => (
                values.next_in_range(40, 64),
                format!("Security patch is {} days old", age),
            ),
            None => (
                values.next_in_range(50, 69),
                "Security patch level unknown".to_string(),
            ),
        };
        Ok(ProbeOutcome::new(
            score,
            description,
            "Install the latest security update",
        ))
    }
}

pub struct SystemProbe;

impl HealthProbe for SystemProbe {
    fn category(&self) -> HealthCategory {
        HealthCategory::System
    }

    fn evaluate(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<ProbeOutcome, HardwareError> {
        let device = facts.device()?;
        let score = match device.os_major_version {
            14.. => values.next_in_range(85, 100),
            12..=13 => values.next_in_range(70, 89),
            10..=11 => values.next_in_range(55, 74),
            _ => values.next_in_range(35, 54),
        };
        Ok(ProbeOutcome::new(
            score,
            format!("Running {} on {}", device.os_version_label, device.model),
            "Update to a newer system version when available",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{StaticHardwareFacts, StorageSnapshot};
    use crate::random::ScriptedValueSource;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn storage_facts(available: u64, total: u64) -> StaticHardwareFacts {
        StaticHardwareFacts {
            storage: Some(StorageSnapshot {
                total_bytes: total * GIB,
                available_bytes: available * GIB,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_storage_bands() {
        // Scripted value far above any band lands on each band's ceiling
        let cases = [(60, 100, 100), (30, 100, 84), (10, 100, 59)];
        for (available, total, ceiling) in cases {
            let facts = storage_facts(available, total);
            let mut values = ScriptedValueSource::new([1000]);
            let outcome = StorageProbe.evaluate(&facts, &mut values).unwrap();
            assert_eq!(outcome.score, ceiling, "{}% free", available);
        }
    }

    #[test]
    fn test_storage_band_floor() {
        let facts = storage_facts(60, 100);
        let mut values = ScriptedValueSource::new([0]);
        let outcome = StorageProbe.evaluate(&facts, &mut values).unwrap();
        assert_eq!(outcome.score, 85);
        assert!(outcome.description.starts_with("60% free"));
    }

    #[test]
    fn test_missing_data_is_error() {
        let facts = StaticHardwareFacts::default();
        let mut values = ScriptedValueSource::default();
        for probe in default_probes() {
            assert!(probe.evaluate(&facts, &mut values).is_err());
        }
    }

    #[test]
    fn test_default_probes_follow_category_order() {
        let categories: Vec<HealthCategory> =
            default_probes().iter().map(|p| p.category()).collect();
        assert_eq!(categories, HealthCategory::ALL.to_vec());
    }

    #[test]
    fn test_degraded_battery_caps_score() {
        let mut facts = StaticHardwareFacts::demo();
        if let Some(battery) = facts.battery.as_mut() {
            battery.health = "Dead".to_string();
        }
        let mut values = ScriptedValueSource::new([100]);
        let outcome = BatteryProbe.evaluate(&facts, &mut values).unwrap();
        assert_eq!(outcome.score, 59);
    }
}
