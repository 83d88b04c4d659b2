//! Run scheduling, latest-result state and history bookkeeping.

use super::{BenchmarkEngine, ComparisonEngine, HealthCheckEngine};
use crate::config::DiagnosticsSettings;
use crate::error::EngineError;
use crate::hardware::HardwareFacts;
use crate::history::HistoryStore;
use crate::models::{
    DeviceComparison, DiagnosticKind, DiagnosticResult, HealthCheckResult, HealthCheckSummary,
    PerformanceScore,
};
use crate::random::{SeededValueSource, ValueSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// One in-flight flag per diagnostic kind
#[derive(Debug, Default)]
pub struct RunGuard {
    flags: [AtomicBool; 3],
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `kind`, or fail if a run already holds it
    pub fn try_acquire(self: &Arc<Self>, kind: DiagnosticKind) -> Result<RunPermit, EngineError> {
        self.flags[kind.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::AlreadyRunning(kind))?;
        Ok(RunPermit {
            guard: Arc::clone(self),
            kind,
        })
    }

    pub fn is_running(&self, kind: DiagnosticKind) -> bool {
        self.flags[kind.index()].load(Ordering::Acquire)
    }
}

/// Releases its kind's slot when dropped
#[derive(Debug)]
pub struct RunPermit {
    guard: Arc<RunGuard>,
    kind: DiagnosticKind,
}

impl RunPermit {
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.guard.flags[self.kind.index()].store(false, Ordering::Release);
    }
}

type ValueSourceFactory = dyn Fn(DiagnosticKind) -> Box<dyn ValueSource> + Send + Sync;

pub struct DiagnosticsService {
    facts: Arc<dyn HardwareFacts>,
    settings: DiagnosticsSettings,
    history: Arc<HistoryStore>,
    guard: Arc<RunGuard>,
    latest: RwLock<[Option<DiagnosticResult>; 3]>,
    values: Box<ValueSourceFactory>,
}

impl DiagnosticsService {
    pub fn new(facts: Arc<dyn HardwareFacts>, settings: DiagnosticsSettings) -> Self {
        let history = Arc::new(HistoryStore::new(settings.history_dir.clone()));
        let seed = settings.rng_seed;
        DiagnosticsService {
            facts,
            settings,
            history,
            guard: Arc::new(RunGuard::new()),
            latest: RwLock::new([None, None, None]),
            // Offset per kind so seeded engines don't replay each other's draws
            values: Box::new(move |kind| {
                let seed = seed.map(|s| s.wrapping_add(kind.index() as u64));
                Box::new(SeededValueSource::from_setting(seed))
            }),
        }
    }

    /// Override how each run's value source is created
    pub fn with_value_sources<F>(mut self, factory: F) -> Self
    where
        F: Fn(DiagnosticKind) -> Box<dyn ValueSource> + Send + Sync + 'static,
    {
        self.values = Box::new(factory);
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn settings(&self) -> &DiagnosticsSettings {
        &self.settings
    }

    pub fn is_running(&self, kind: DiagnosticKind) -> bool {
        self.guard.is_running(kind)
    }

    /// Most recent successful result of `kind` from this process
    pub fn latest(&self, kind: DiagnosticKind) -> Option<DiagnosticResult> {
        let slots = self.latest.read().unwrap_or_else(|p| p.into_inner());
        slots[kind.index()].clone()
    }

    fn publish(&self, result: DiagnosticResult) {
        let mut slots = self.latest.write().unwrap_or_else(|p| p.into_inner());
        let index = result.kind().index();
        slots[index] = Some(result);
    }

    pub async fn run(&self, kind: DiagnosticKind) -> Result<DiagnosticResult, EngineError> {
        match kind {
            DiagnosticKind::HealthCheck => self.run_health().await.map(DiagnosticResult::from),
            DiagnosticKind::Performance => self.run_benchmark().await.map(DiagnosticResult::from),
            DiagnosticKind::Comparison => self.run_comparison().await.map(DiagnosticResult::from),
        }
    }

    pub async fn run_health(&self) -> Result<HealthCheckResult, EngineError> {
        let _permit = self.guard.try_acquire(DiagnosticKind::HealthCheck)?;
        let mut engine = HealthCheckEngine::new(
            Arc::clone(&self.facts),
            (self.values)(DiagnosticKind::HealthCheck),
        )
        .with_step_delay(self.settings.step_delay());

        let result = run_blocking(move || engine.run()).await?;

        let (device_name, os_label) = match self.facts.device() {
            Ok(d) => (d.device_name, d.os_version_label),
            Err(_) => ("Unknown device".to_string(), "Unknown".to_string()),
        };
        let summary = HealthCheckSummary::from_result(&result, device_name, os_label);
        self.record(DiagnosticKind::HealthCheck, summary).await;
        self.publish(result.clone().into());
        Ok(result)
    }

    pub async fn run_benchmark(&self) -> Result<PerformanceScore, EngineError> {
        let _permit = self.guard.try_acquire(DiagnosticKind::Performance)?;
        let mut engine = BenchmarkEngine::new(
            Arc::clone(&self.facts),
            (self.values)(DiagnosticKind::Performance),
        )
        .with_population(self.settings.population_size)
        .with_step_delay(self.settings.step_delay());

        let result = run_blocking(move || engine.run()).await?;

        self.record(DiagnosticKind::Performance, result.clone()).await;
        self.publish(result.clone().into());
        Ok(result)
    }

    pub async fn run_comparison(&self) -> Result<DeviceComparison, EngineError> {
        let _permit = self.guard.try_acquire(DiagnosticKind::Comparison)?;
        let performance = self.latest_performance().await;
        let mut engine = ComparisonEngine::new(
            Arc::clone(&self.facts),
            (self.values)(DiagnosticKind::Comparison),
        )
        .with_performance(performance);

        let result = run_blocking(move || engine.run()).await?;

        self.record(DiagnosticKind::Comparison, result.clone()).await;
        self.publish(result.clone().into());
        Ok(result)
    }

    /// This process's latest benchmark, else the newest one in history
    async fn latest_performance(&self) -> Option<PerformanceScore> {
        if let Some(DiagnosticResult::Performance(score)) = self.latest(DiagnosticKind::Performance) {
            return Some(score);
        }
        let history = Arc::clone(&self.history);
        let read = tokio::task::spawn_blocking(move || {
            history.latest::<PerformanceScore>(DiagnosticKind::Performance)
        })
        .await;
        match read {
            Ok(Ok(score)) => score,
            Ok(Err(e)) => {
                log::warn!("[SERVICE] Ignoring unreadable benchmark history: {}", e);
                None
            }
            Err(e) => {
                log::warn!("[SERVICE] Benchmark history read did not finish: {}", e);
                None
            }
        }
    }

    /// History is best-effort: a failed write is logged and the run still succeeds.
    /// File IO stays on the blocking pool.
    async fn record<T>(&self, kind: DiagnosticKind, record: T)
    where
        T: serde::Serialize + Send + 'static,
    {
        let history = Arc::clone(&self.history);
        let saved = tokio::task::spawn_blocking(move || history.append(kind, &record)).await;
        match saved {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => log::error!("[SERVICE] Failed to save {} history: {}", kind, e),
            Err(e) => log::error!("[SERVICE] {} history write did not finish: {}", kind, e),
        }
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| EngineError::Join(e.to_string()))?
}
