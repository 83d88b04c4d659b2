//! Diagnostic engines and the service that schedules them.
//!
//! Each engine is synchronous and self-contained: it reads hardware facts,
//! draws simulated values from its own `ValueSource` and returns one complete
//! result or an error. `DiagnosticsService` runs them off the async executor
//! and enforces one in-flight run per kind.

pub mod benchmark;
pub mod comparison;
pub mod health;
pub mod health_probes;
pub mod service;

pub use benchmark::{BenchmarkEngine, BenchmarkMeasurement, BenchmarkProbe};
pub use comparison::ComparisonEngine;
pub use health::HealthCheckEngine;
pub use health_probes::{HealthProbe, ProbeOutcome};
pub use service::{DiagnosticsService, RunGuard, RunPermit};
