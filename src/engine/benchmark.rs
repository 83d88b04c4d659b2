//! Benchmark engine
//!
//! Runs the CPU, GPU, RAM and storage benchmarks in that order, grades each
//! category and derives a simulated global ranking from the overall score.

use crate::error::{EngineError, HardwareError};
use crate::grading::{clamp_score, PerformanceGrade};
use crate::hardware::HardwareFacts;
use crate::models::{
    BenchmarkCategory, BenchmarkResult, CategoryScore, DeviceRanking, PerformanceScore,
    SimilarDevice,
};
use crate::random::ValueSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Fixed run order
pub const BENCHMARK_ORDER: [BenchmarkCategory; 4] = [
    BenchmarkCategory::Cpu,
    BenchmarkCategory::Gpu,
    BenchmarkCategory::Ram,
    BenchmarkCategory::Storage,
];

/// Simulated population bounds when no size is configured
pub const POPULATION_MIN: i32 = 50_000;
pub const POPULATION_MAX: i32 = 100_000;

/// Reference devices and the symmetric spread of their simulated scores
pub const SIMILAR_DEVICES: [(&str, i32); 4] = [
    ("Samsung Galaxy S23", 12),
    ("Google Pixel 8", 8),
    ("OnePlus 11", 10),
    ("Xiaomi 13", 15),
];

/// Raw output of one category benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkMeasurement {
    pub score: i32,
    pub sub_results: Vec<BenchmarkResult>,
}

pub trait BenchmarkProbe: Send + Sync {
    fn category(&self) -> BenchmarkCategory;

    fn measure(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<BenchmarkMeasurement, HardwareError>;
}

pub fn default_benchmarks() -> Vec<Box<dyn BenchmarkProbe>> {
    vec![
        Box::new(CpuBenchmark),
        Box::new(GpuBenchmark),
        Box::new(RamBenchmark),
        Box::new(StorageBenchmark),
    ]
}

fn order_index(category: BenchmarkCategory) -> Option<usize> {
    BENCHMARK_ORDER.iter().position(|c| *c == category)
}

fn sub_result(
    category: BenchmarkCategory,
    test_name: &str,
    score: f64,
    unit: &str,
    description: &str,
    values: &mut dyn ValueSource,
) -> BenchmarkResult {
    BenchmarkResult {
        test_name: test_name.to_string(),
        category,
        score,
        unit: unit.to_string(),
        description: description.to_string(),
        duration_ms: values.next_in_range(150, 600) as u64,
        timestamp: Utc::now(),
    }
}

pub struct CpuBenchmark;

impl BenchmarkProbe for CpuBenchmark {
    fn category(&self) -> BenchmarkCategory {
        BenchmarkCategory::Cpu
    }

    fn measure(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<BenchmarkMeasurement, HardwareError> {
        let cpu = facts.cpu()?;
        if cpu.core_count == 0 {
            return Err(HardwareError::Invalid("CPU reports zero cores".to_string()));
        }
        let cat = BenchmarkCategory::Cpu;
        let single = values.next_in_range(900, 1500) as f64;
        let multi = (single * cpu.core_count as f64 * 0.8).round();
        let int_ops = values.next_in_range(2000, 6000) as f64;

        let score = match cpu.peak_mhz() {
            2800.. => values.next_in_range(80, 100),
            2200..=2799 => values.next_in_range(65, 84),
            _ => values.next_in_range(45, 69),
        };

        let sub_results = vec![
            sub_result(cat, "Single-Core", single, "pts", "Single-threaded workload", values),
            sub_result(cat, "Multi-Core", multi, "pts", "All cores under load", values),
            sub_result(cat, "Integer Ops", int_ops, "MOPS", "Integer arithmetic throughput", values),
        ];
        Ok(BenchmarkMeasurement { score, sub_results })
    }
}

pub struct GpuBenchmark;

impl BenchmarkProbe for GpuBenchmark {
    fn category(&self) -> BenchmarkCategory {
        BenchmarkCategory::Gpu
    }

    fn measure(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<BenchmarkMeasurement, HardwareError> {
        let gpu = facts.gpu()?;
        let cat = BenchmarkCategory::Gpu;
        let fps = values.next_in_range(30, 120) as f64;
        let gflops = values.next_in_range(200, 1500) as f64;

        // A GPU already busy elsewhere benches lower
        let score = match gpu.load_percent {
            Some(load) if load > 50 => values.next_in_range(40, 75),
            _ => values.next_in_range(60, 95),
        };

        let sub_results = vec![
            sub_result(cat, "3D Rendering", fps, "fps", "Offscreen scene rendering", values),
            sub_result(cat, "Compute", gflops, "GFLOPS", "Shader compute throughput", values),
        ];
        Ok(BenchmarkMeasurement { score, sub_results })
    }
}

pub struct RamBenchmark;

impl BenchmarkProbe for RamBenchmark {
    fn category(&self) -> BenchmarkCategory {
        BenchmarkCategory::Ram
    }

    fn measure(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<BenchmarkMeasurement, HardwareError> {
        let memory = facts.memory()?;
        let cat = BenchmarkCategory::Ram;
        let read = values.next_in_range(8000, 20000) as f64;
        let write = values.next_in_range(6000, 15000) as f64;
        let latency = values.next_in_range(60, 120) as f64;

        let total = memory.total_gb();
        let score = if total >= 8.0 {
            values.next_in_range(80, 100)
        } else if total >= 6.0 {
            values.next_in_range(65, 84)
        } else if total >= 4.0 {
            values.next_in_range(50, 69)
        } else {
            values.next_in_range(30, 49)
        };

        let sub_results = vec![
            sub_result(cat, "Memory Read", read, "MB/s", "Sequential read bandwidth", values),
            sub_result(cat, "Memory Write", write, "MB/s", "Sequential write bandwidth", values),
            sub_result(cat, "Memory Latency", latency, "ns", "Random access latency", values),
        ];
        Ok(BenchmarkMeasurement { score, sub_results })
    }
}

pub struct StorageBenchmark;

impl BenchmarkProbe for StorageBenchmark {
    fn category(&self) -> BenchmarkCategory {
        BenchmarkCategory::Storage
    }

    fn measure(
        &self,
        facts: &dyn HardwareFacts,
        values: &mut dyn ValueSource,
    ) -> Result<BenchmarkMeasurement, HardwareError> {
        let storage = facts.storage()?;
        let cat = BenchmarkCategory::Storage;
        let seq_read = values.next_in_range(800, 3000) as f64;
        let seq_write = values.next_in_range(300, 1500) as f64;
        let iops = values.next_in_range(10_000, 80_000) as f64;

        let total = storage.total_gb();
        let score = if total >= 256.0 {
            values.next_in_range(80, 100)
        } else if total >= 128.0 {
            values.next_in_range(70, 89)
        } else if total >= 64.0 {
            values.next_in_range(55, 74)
        } else {
            values.next_in_range(35, 59)
        };

        let sub_results = vec![
            sub_result(cat, "Sequential Read", seq_read, "MB/s", "Large file read", values),
            sub_result(cat, "Sequential Write", seq_write, "MB/s", "Large file write", values),
            sub_result(cat, "Random I/O", iops, "IOPS", "4K random read/write", values),
        ];
        Ok(BenchmarkMeasurement { score, sub_results })
    }
}

pub struct BenchmarkEngine {
    facts: Arc<dyn HardwareFacts>,
    values: Box<dyn ValueSource>,
    probes: Vec<Box<dyn BenchmarkProbe>>,
    population: Option<u32>,
    step_delay: Duration,
}

impl BenchmarkEngine {
    pub fn new(facts: Arc<dyn HardwareFacts>, values: Box<dyn ValueSource>) -> Self {
        BenchmarkEngine {
            facts,
            values,
            probes: default_benchmarks(),
            population: None,
            step_delay: Duration::ZERO,
        }
    }

    /// Replace the benchmark for one of the four run categories.
    /// Probes for other categories are ignored.
    pub fn with_probe(mut self, probe: Box<dyn BenchmarkProbe>) -> Self {
        match order_index(probe.category()) {
            Some(slot) => self.probes[slot] = probe,
            None => log::warn!(
                "[BENCH] Ignoring probe for unranked category {}",
                probe.category().label()
            ),
        }
        self
    }

    /// Fixed population size; `None` draws one per run
    pub fn with_population(mut self, population: Option<u32>) -> Self {
        self.population = population;
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn run(&mut self) -> Result<PerformanceScore, EngineError> {
        log::info!("[BENCH] Starting benchmark run");
        let mut category_scores = Vec::with_capacity(BENCHMARK_ORDER.len());

        for probe in &self.probes {
            let category = probe.category();
            let score = match probe.measure(self.facts.as_ref(), self.values.as_mut()) {
                Ok(m) => {
                    let grade = PerformanceGrade::from_score(m.score);
                    let details = format!(
                        "{} {} performance across {} tests",
                        grade.verdict(),
                        category.label(),
                        m.sub_results.len()
                    );
                    CategoryScore::new(category, m.score, details, m.sub_results)
                }
                Err(e) => {
                    log::warn!("[BENCH] {} benchmark degraded: {}", category.label(), e);
                    CategoryScore::new(
                        category,
                        0,
                        format!("Benchmark unavailable: {}", e),
                        Vec::new(),
                    )
                }
            };
            log::debug!(
                "[BENCH] {} -> {} ({})",
                category.label(),
                score.score,
                score.grade
            );
            category_scores.push(score);

            if !self.step_delay.is_zero() {
                std::thread::sleep(self.step_delay);
            }
        }

        let total_devices = match self.population {
            Some(n) => n.max(1),
            None => self.values.next_in_range(POPULATION_MIN, POPULATION_MAX) as u32,
        };
        let result = aggregate_benchmarks(
            category_scores,
            total_devices,
            self.values.as_mut(),
            Utc::now(),
        )?;
        log::info!(
            "[BENCH] ✓ Benchmark complete: {} ({})",
            result.overall_score,
            result.grade
        );
        Ok(result)
    }
}

/// `round((100 - overall) / 100 * total)`, kept inside `[1, total]`
pub fn global_rank(overall_score: i32, total_devices: u32) -> u32 {
    let total = total_devices.max(1);
    let fraction = (100 - clamp_score(overall_score)) as f64 / 100.0;
    let rank = (fraction * total as f64).round() as u32;
    rank.clamp(1, total)
}

/// Reference devices with scores perturbed around the current score
pub fn similar_devices(overall_score: i32, values: &mut dyn ValueSource) -> Vec<SimilarDevice> {
    SIMILAR_DEVICES
        .iter()
        .map(|(name, spread)| {
            let offset = values.next_in_range(-spread, *spread);
            let score = clamp_score(overall_score + offset);
            SimilarDevice {
                name: name.to_string(),
                score,
                score_delta: score - overall_score,
            }
        })
        .collect()
}

/// Fold the four category scores into a graded, ranked result.
pub fn aggregate_benchmarks(
    category_scores: Vec<CategoryScore>,
    total_devices: u32,
    values: &mut dyn ValueSource,
    timestamp: DateTime<Utc>,
) -> Result<PerformanceScore, EngineError> {
    if category_scores.len() != BENCHMARK_ORDER.len() {
        return Err(EngineError::Aggregation(format!(
            "expected {} category scores, got {}",
            BENCHMARK_ORDER.len(),
            category_scores.len()
        )));
    }

    let sum: i64 = category_scores.iter().map(|c| c.score as i64).sum();
    let overall_score = (sum / category_scores.len() as i64) as i32;

    let benchmark_results = category_scores
        .iter()
        .flat_map(|c| c.sub_results.iter().cloned())
        .collect();

    let ranking = DeviceRanking {
        global_rank: global_rank(overall_score, total_devices),
        total_devices: total_devices.max(1),
        percentile: overall_score,
        similar_devices: similar_devices(overall_score, values),
    };

    Ok(PerformanceScore {
        overall_score,
        grade: PerformanceGrade::from_score(overall_score),
        category_scores,
        benchmark_results,
        device_ranking: Some(ranking),
        last_test_time: timestamp,
    })
}
