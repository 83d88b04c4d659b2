//! Device comparison engine
//!
//! Places the current device among a fixed set of reference profiles on ten
//! axes and derives strengths and weaknesses from the per-axis rankings.

use crate::error::EngineError;
use crate::hardware::HardwareFacts;
use crate::models::{
    BenchmarkCategory, ComparisonCategory, ComparisonResult, DeviceComparison, DeviceMetrics,
    DeviceProfile, DeviceSpecifications, OverallComparison, PerformanceScore,
};
use crate::random::ValueSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct ComparisonEngine {
    facts: Arc<dyn HardwareFacts>,
    values: Box<dyn ValueSource>,
    performance: Option<PerformanceScore>,
    references: Vec<DeviceProfile>,
}

impl ComparisonEngine {
    pub fn new(facts: Arc<dyn HardwareFacts>, values: Box<dyn ValueSource>) -> Self {
        ComparisonEngine {
            facts,
            values,
            performance: None,
            references: reference_profiles(),
        }
    }

    /// Feed the latest benchmark so overall and GPU scores are measured, not simulated
    pub fn with_performance(mut self, performance: Option<PerformanceScore>) -> Self {
        self.performance = performance;
        self
    }

    pub fn with_references(mut self, references: Vec<DeviceProfile>) -> Self {
        self.references = references;
        self
    }

    pub fn run(&mut self) -> Result<DeviceComparison, EngineError> {
        log::info!(
            "[COMPARE] Comparing against {} reference devices",
            self.references.len()
        );
        let current = current_profile(
            self.facts.as_ref(),
            self.performance.as_ref(),
            self.values.as_mut(),
        );
        let comparison = compare(current, self.references.clone(), Utc::now())?;
        log::info!(
            "[COMPARE] ✓ Ranked #{} of {} ({:.1} percentile)",
            comparison.overall_comparison.overall_ranking,
            comparison.overall_comparison.total_devices,
            comparison.overall_comparison.percentile
        );
        Ok(comparison)
    }
}

/// Position of `current` among `current ∪ others` sorted descending.
/// Equal values share the first slot.
pub fn rank_of(current: f64, others: &[f64]) -> u32 {
    1 + others.iter().filter(|v| **v > current).count() as u32
}

/// Build the current device profile. Unreadable components leave their
/// metrics at zero and their specification text at "Unknown".
pub fn current_profile(
    facts: &dyn HardwareFacts,
    performance: Option<&PerformanceScore>,
    values: &mut dyn ValueSource,
) -> DeviceProfile {
    let mut metrics = DeviceMetrics::default();
    let mut specs = DeviceSpecifications {
        cpu: "Unknown".to_string(),
        ram: "Unknown".to_string(),
        storage: "Unknown".to_string(),
        display: "Unknown".to_string(),
        battery: "Unknown".to_string(),
    };

    let (device_name, manufacturer, model) = match facts.device() {
        Ok(d) => (d.device_name, d.manufacturer, d.model),
        Err(e) => {
            log::warn!("[COMPARE] Device identity unavailable: {}", e);
            (
                "Unknown device".to_string(),
                "Unknown".to_string(),
                "Unknown".to_string(),
            )
        }
    };

    match facts.cpu() {
        Ok(cpu) => {
            metrics.cpu_cores = cpu.core_count as f64;
            metrics.cpu_max_mhz = cpu.peak_mhz() as f64;
            specs.cpu = format!(
                "{}, {} cores @ {} MHz",
                cpu.model,
                cpu.core_count,
                cpu.peak_mhz()
            );
        }
        Err(e) => log::warn!("[COMPARE] {}", e),
    }
    match facts.memory() {
        Ok(mem) => {
            metrics.ram_gb = mem.total_gb().round();
            specs.ram = format!("{:.0} GB", metrics.ram_gb);
        }
        Err(e) => log::warn!("[COMPARE] {}", e),
    }
    match facts.storage() {
        Ok(storage) => {
            metrics.storage_gb = storage.total_gb().round();
            specs.storage = format!("{:.0} GB", metrics.storage_gb);
        }
        Err(e) => log::warn!("[COMPARE] {}", e),
    }
    match facts.display() {
        Ok(display) => {
            metrics.display_ppi = display.density_ppi as f64;
            metrics.refresh_rate_hz = display.refresh_rate_hz as f64;
            specs.display = format!(
                "{}x{}, {} ppi, {} Hz",
                display.width_px, display.height_px, display.density_ppi, display.refresh_rate_hz
            );
        }
        Err(e) => log::warn!("[COMPARE] {}", e),
    }
    match facts.battery() {
        Ok(battery) => {
            if let Some(mah) = battery.design_capacity_mah {
                metrics.battery_mah = mah as f64;
                specs.battery = format!("{} mAh", mah);
            }
        }
        Err(e) => log::warn!("[COMPARE] {}", e),
    }
    match facts.camera() {
        Ok(camera) => metrics.camera_mp = camera.main_megapixels,
        Err(e) => log::warn!("[COMPARE] {}", e),
    }

    let measured_gpu = performance.and_then(|p| p.category_score(BenchmarkCategory::Gpu));
    metrics.gpu_score = match measured_gpu {
        Some(score) => score as f64,
        None => values.next_in_range(50, 90) as f64,
    };
    let performance_score = match performance {
        Some(p) => p.overall_score,
        None => values.next_in_range(50, 90),
    };

    let mut profile = DeviceProfile {
        device_name,
        manufacturer,
        model,
        specifications: specs,
        performance_score,
        is_current_device: true,
        metrics,
    };
    zero_non_finite(&mut profile);
    profile
}

/// Replace NaN and infinite metrics with the 0.0 "unavailable" value.
fn zero_non_finite(profile: &mut DeviceProfile) {
    let m = &mut profile.metrics;
    let readings: [(&str, &mut f64); 9] = [
        ("CPU cores", &mut m.cpu_cores),
        ("CPU frequency", &mut m.cpu_max_mhz),
        ("GPU score", &mut m.gpu_score),
        ("RAM", &mut m.ram_gb),
        ("storage", &mut m.storage_gb),
        ("display density", &mut m.display_ppi),
        ("refresh rate", &mut m.refresh_rate_hz),
        ("battery capacity", &mut m.battery_mah),
        ("camera resolution", &mut m.camera_mp),
    ];
    for (name, value) in readings {
        if !value.is_finite() {
            log::warn!(
                "[COMPARE] {} reading {} for {} treated as unavailable",
                name,
                value,
                profile.device_name
            );
            *value = 0.0;
        }
    }
}

/// Rank `current` against `references` on every axis.
pub fn compare(
    mut current: DeviceProfile,
    mut references: Vec<DeviceProfile>,
    timestamp: DateTime<Utc>,
) -> Result<DeviceComparison, EngineError> {
    if references.is_empty() {
        return Err(EngineError::Aggregation(
            "no reference devices to compare against".to_string(),
        ));
    }
    zero_non_finite(&mut current);
    references.iter_mut().for_each(zero_non_finite);
    let total_devices = references.len() as u32 + 1;

    let comparison_results: Vec<ComparisonResult> = ComparisonCategory::ALL
        .iter()
        .map(|category| {
            let current_value = current.metric(*category);
            let others: Vec<f64> = references.iter().map(|r| r.metric(*category)).collect();
            let all = std::iter::once(current_value).chain(others.iter().copied());

            let (sum, best, worst) = all.fold(
                (0.0, f64::NEG_INFINITY, f64::INFINITY),
                |(sum, best, worst), v| (sum + v, best.max(v), worst.min(v)),
            );
            ComparisonResult {
                category: *category,
                current_score: current_value,
                average_score: sum / total_devices as f64,
                best_score: best,
                worst_score: worst,
                ranking: rank_of(current_value, &others),
                total_devices,
                unit: category.unit().to_string(),
                description: category.description().to_string(),
            }
        })
        .collect();

    let overall_comparison = overall(&comparison_results, total_devices);

    Ok(DeviceComparison {
        current_device: current,
        compared_devices: references,
        comparison_results,
        overall_comparison,
        last_update_time: timestamp,
    })
}

fn overall(results: &[ComparisonResult], total_devices: u32) -> OverallComparison {
    let rank_sum: u64 = results.iter().map(|r| r.ranking as u64).sum();
    let overall_ranking = (rank_sum / results.len().max(1) as u64) as u32;
    let percentile = percentile(overall_ranking, total_devices);

    let half = total_devices / 2;
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for r in results {
        let line = format!("{} (#{} of {})", r.category.label(), r.ranking, total_devices);
        if r.ranking <= half {
            strengths.push(line);
        } else if r.ranking > total_devices - half {
            weaknesses.push(line);
        }
    }

    OverallComparison {
        overall_ranking,
        total_devices,
        percentile,
        strengths,
        weaknesses,
        recommendation: recommendation_for(percentile).to_string(),
    }
}

/// `(total - rank + 1) / total * 100`
pub fn percentile(rank: u32, total_devices: u32) -> f64 {
    let total = total_devices.max(1) as f64;
    (total - rank as f64 + 1.0) / total * 100.0
}

fn recommendation_for(percentile: f64) -> &'static str {
    if percentile >= 80.0 {
        "Your device is among the top performers in its class"
    } else if percentile >= 50.0 {
        "Your device performs above average for everyday use"
    } else if percentile >= 25.0 {
        "Your device handles common tasks but trails newer models"
    } else {
        "Consider upgrading for demanding apps and games"
    }
}

struct Reference {
    name: &'static str,
    manufacturer: &'static str,
    model: &'static str,
    cpu: &'static str,
    performance_score: i32,
    metrics: DeviceMetrics,
}

impl Reference {
    fn into_profile(self) -> DeviceProfile {
        let m = &self.metrics;
        let specifications = DeviceSpecifications {
            cpu: format!("{}, {} cores @ {} MHz", self.cpu, m.cpu_cores, m.cpu_max_mhz),
            ram: format!("{} GB", m.ram_gb),
            storage: format!("{} GB", m.storage_gb),
            display: format!("{} ppi, {} Hz", m.display_ppi, m.refresh_rate_hz),
            battery: format!("{} mAh", m.battery_mah),
        };
        DeviceProfile {
            device_name: self.name.to_string(),
            manufacturer: self.manufacturer.to_string(),
            model: self.model.to_string(),
            specifications,
            performance_score: self.performance_score,
            is_current_device: false,
            metrics: self.metrics,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn metrics(
    cores: f64,
    mhz: f64,
    gpu: f64,
    ram: f64,
    storage: f64,
    ppi: f64,
    hz: f64,
    mah: f64,
    mp: f64,
) -> DeviceMetrics {
    DeviceMetrics {
        cpu_cores: cores,
        cpu_max_mhz: mhz,
        gpu_score: gpu,
        ram_gb: ram,
        storage_gb: storage,
        display_ppi: ppi,
        refresh_rate_hz: hz,
        battery_mah: mah,
        camera_mp: mp,
    }
}

/// Built-in reference population
pub fn reference_profiles() -> Vec<DeviceProfile> {
    vec![
        Reference {
            name: "Samsung Galaxy S23",
            manufacturer: "Samsung",
            model: "SM-S911B",
            cpu: "Snapdragon 8 Gen 2",
            performance_score: 90,
            metrics: metrics(8.0, 3360.0, 92.0, 8.0, 256.0, 425.0, 120.0, 3900.0, 50.0),
        },
        Reference {
            name: "Google Pixel 8",
            manufacturer: "Google",
            model: "GKWS6",
            cpu: "Google Tensor G3",
            performance_score: 84,
            metrics: metrics(9.0, 2910.0, 85.0, 8.0, 128.0, 428.0, 120.0, 4575.0, 50.0),
        },
        Reference {
            name: "OnePlus 11",
            manufacturer: "OnePlus",
            model: "PHB110",
            cpu: "Snapdragon 8 Gen 2",
            performance_score: 88,
            metrics: metrics(8.0, 3200.0, 90.0, 16.0, 256.0, 525.0, 120.0, 5000.0, 50.0),
        },
        Reference {
            name: "Xiaomi 13",
            manufacturer: "Xiaomi",
            model: "2211133G",
            cpu: "Snapdragon 8 Gen 2",
            performance_score: 87,
            metrics: metrics(8.0, 3200.0, 89.0, 12.0, 256.0, 414.0, 120.0, 4500.0, 50.0),
        },
        Reference {
            name: "Samsung Galaxy A54",
            manufacturer: "Samsung",
            model: "SM-A546B",
            cpu: "Exynos 1380",
            performance_score: 62,
            metrics: metrics(8.0, 2400.0, 55.0, 6.0, 128.0, 403.0, 120.0, 5000.0, 50.0),
        },
    ]
    .into_iter()
    .map(Reference::into_profile)
    .collect()
}
