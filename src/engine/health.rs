//! Health check engine
//!
//! Runs the eight category probes in fixed order and aggregates them.
//! A probe that fails to read its data still yields a check (score 0 with
//! a message), so every category is always present in the result.

use super::health_probes::{default_probes, HealthProbe};
use crate::error::EngineError;
use crate::grading::HealthStatus;
use crate::hardware::HardwareFacts;
use crate::models::{HealthCategory, HealthCheck, HealthCheckResult};
use crate::random::ValueSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Checks scoring below this surface their recommendation
pub const RECOMMENDATION_THRESHOLD: i32 = 80;

pub struct HealthCheckEngine {
    facts: Arc<dyn HardwareFacts>,
    values: Box<dyn ValueSource>,
    probes: Vec<Box<dyn HealthProbe>>,
    step_delay: Duration,
}

impl HealthCheckEngine {
    pub fn new(facts: Arc<dyn HardwareFacts>, values: Box<dyn ValueSource>) -> Self {
        HealthCheckEngine {
            facts,
            values,
            probes: default_probes(),
            step_delay: Duration::ZERO,
        }
    }

    /// Replace the probe for one category. Run order is unaffected.
    pub fn with_probe(mut self, probe: Box<dyn HealthProbe>) -> Self {
        let slot = probe.category().index();
        self.probes[slot] = probe;
        self
    }

    /// Simulated latency between probes
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Run every probe, in order, then aggregate.
    pub fn run(&mut self) -> Result<HealthCheckResult, EngineError> {
        log::info!("[HEALTH] Starting health check ({} probes)", self.probes.len());
        let mut checks = Vec::with_capacity(HealthCategory::ALL.len());

        for probe in &self.probes {
            let category = probe.category();
            let check = match probe.evaluate(self.facts.as_ref(), self.values.as_mut()) {
                Ok(outcome) => HealthCheck::new(
                    category,
                    outcome.score,
                    outcome.description,
                    outcome.recommendation,
                ),
                Err(e) => {
                    log::warn!("[HEALTH] {} check degraded: {}", category.label(), e);
                    HealthCheck::new(category, 0, format!("Check unavailable: {}", e), None)
                }
            };
            log::debug!(
                "[HEALTH] {} -> {} ({})",
                check.name,
                check.score,
                check.status
            );
            checks.push(check);

            if !self.step_delay.is_zero() {
                std::thread::sleep(self.step_delay);
            }
        }

        let result = aggregate_health(checks, Utc::now())?;
        log::info!(
            "[HEALTH] ✓ Health check complete: {} ({})",
            result.overall_score,
            result.overall_status
        );
        Ok(result)
    }
}

/// Fold exactly eight checks into a result.
///
/// Overall score is the truncated mean. Recommendations come from checks
/// below `RECOMMENDATION_THRESHOLD`, deduplicated, in check order.
pub fn aggregate_health(
    checks: Vec<HealthCheck>,
    timestamp: DateTime<Utc>,
) -> Result<HealthCheckResult, EngineError> {
    if checks.len() != HealthCategory::ALL.len() {
        return Err(EngineError::Aggregation(format!(
            "expected {} checks, got {}",
            HealthCategory::ALL.len(),
            checks.len()
        )));
    }
    for (check, expected) in checks.iter().zip(HealthCategory::ALL.iter()) {
        if check.category != *expected {
            return Err(EngineError::Aggregation(format!(
                "check order broken: found {} where {} was expected",
                check.category.label(),
                expected.label()
            )));
        }
    }

    let sum: i64 = checks.iter().map(|c| c.score as i64).sum();
    let overall_score = (sum / checks.len() as i64) as i32;

    let mut recommendations: Vec<String> = Vec::new();
    for check in &checks {
        if check.score >= RECOMMENDATION_THRESHOLD {
            continue;
        }
        if let Some(rec) = &check.recommendation {
            if !recommendations.contains(rec) {
                recommendations.push(rec.clone());
            }
        }
    }

    Ok(HealthCheckResult {
        overall_score,
        overall_status: HealthStatus::from_score(overall_score),
        checks,
        recommendations,
        timestamp,
    })
}
