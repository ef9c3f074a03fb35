//! # Slow-Query Log
//!
//! Times store calls and logs the ones exceeding their kind's threshold.

use crate::config::SlowQueryThresholds;
use crate::domain::QueryKind;
use crate::metrics;
use std::time::{Duration, Instant};
use tracing::warn;

/// Slow-query timer.
#[derive(Clone, Debug, Default)]
pub struct SlowQueryLog {
    thresholds: SlowQueryThresholds,
}

impl SlowQueryLog {
    /// Create a log with the given thresholds.
    pub fn new(thresholds: SlowQueryThresholds) -> Self {
        Self { thresholds }
    }

    /// Get the thresholds.
    pub fn thresholds(&self) -> &SlowQueryThresholds {
        &self.thresholds
    }

    /// Run `call`, logging it when it exceeds the threshold for `kind`.
    pub fn time<T>(&self, kind: QueryKind, resource: &str, call: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = call();
        self.observe(kind, resource, started.elapsed());
        result
    }

    /// Record an already measured call. Returns whether it was slow.
    pub fn observe(&self, kind: QueryKind, resource: &str, elapsed: Duration) -> bool {
        metrics::record_store_call(kind.as_str(), elapsed);
        if elapsed <= self.thresholds.threshold(kind) {
            return false;
        }
        metrics::record_slow_query(kind.as_str());
        warn!(
            kind = %kind,
            resource,
            elapsed_ms = elapsed.as_millis() as u64,
            "[slow-query] store call exceeded threshold"
        );
        true
    }
}
