//! # Data Layer Metrics
//!
//! Prometheus metrics for store calls and cache effectiveness.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! ts-06-data-layer = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `tessera_store_calls_total` - Counter of store calls (by kind)
//! - `tessera_store_call_seconds` - Histogram of store call latency (by kind)
//! - `tessera_slow_queries_total` - Counter of calls over their threshold (by kind)
//! - `tessera_cache_lookups_total` - Counter of cache lookups (by level and outcome)
//! - `tessera_cache_errors_total` - Counter of swallowed cache errors
//! - `tessera_partial_commits_total` - Counter of partially committed transactions

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Store calls, labeled by kind
    pub static ref STORE_CALLS: IntCounterVec = register_int_counter_vec!(
        "tessera_store_calls_total",
        "Total number of store calls",
        &["kind"]
    )
    .expect("Failed to create STORE_CALLS metric");

    /// Store call latency, labeled by kind
    pub static ref STORE_CALL_SECONDS: HistogramVec = register_histogram_vec!(
        "tessera_store_call_seconds",
        "Store call latency in seconds",
        &["kind"]
    )
    .expect("Failed to create STORE_CALL_SECONDS metric");

    /// Slow store calls, labeled by kind
    pub static ref SLOW_QUERIES: IntCounterVec = register_int_counter_vec!(
        "tessera_slow_queries_total",
        "Total number of store calls over their slow-query threshold",
        &["kind"]
    )
    .expect("Failed to create SLOW_QUERIES metric");

    /// Cache lookups, labeled by level (l1, l2, count) and outcome (hit, miss)
    pub static ref CACHE_LOOKUPS: IntCounterVec = register_int_counter_vec!(
        "tessera_cache_lookups_total",
        "Total number of cache lookups",
        &["level", "outcome"]
    )
    .expect("Failed to create CACHE_LOOKUPS metric");

    /// Cache errors swallowed by the data layer
    pub static ref CACHE_ERRORS: IntCounter = register_int_counter!(
        "tessera_cache_errors_total",
        "Total number of cache errors that fell back to the store"
    )
    .expect("Failed to create CACHE_ERRORS metric");

    /// Partially committed transactions
    pub static ref PARTIAL_COMMITS: IntCounter = register_int_counter!(
        "tessera_partial_commits_total",
        "Total number of transactions that committed on some resources only"
    )
    .expect("Failed to create PARTIAL_COMMITS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a store call and its latency
#[cfg(feature = "metrics")]
pub fn record_store_call(kind: &str, elapsed: std::time::Duration) {
    STORE_CALLS.with_label_values(&[kind]).inc();
    STORE_CALL_SECONDS
        .with_label_values(&[kind])
        .observe(elapsed.as_secs_f64());
}

/// Record a slow store call
#[cfg(feature = "metrics")]
pub fn record_slow_query(kind: &str) {
    SLOW_QUERIES.with_label_values(&[kind]).inc();
}

/// Record a cache lookup outcome
#[cfg(feature = "metrics")]
pub fn record_cache_lookup(level: &str, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    CACHE_LOOKUPS.with_label_values(&[level, outcome]).inc();
}

/// Record a swallowed cache error
#[cfg(feature = "metrics")]
pub fn record_cache_error() {
    CACHE_ERRORS.inc();
}

/// Record a partial commit
#[cfg(feature = "metrics")]
pub fn record_partial_commit() {
    PARTIAL_COMMITS.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a store call and its latency
#[cfg(not(feature = "metrics"))]
pub fn record_store_call(_kind: &str, _elapsed: std::time::Duration) {}

/// Record a slow store call
#[cfg(not(feature = "metrics"))]
pub fn record_slow_query(_kind: &str) {}

/// Record a cache lookup outcome
#[cfg(not(feature = "metrics"))]
pub fn record_cache_lookup(_level: &str, _hit: bool) {}

/// Record a swallowed cache error
#[cfg(not(feature = "metrics"))]
pub fn record_cache_error() {}

/// Record a partial commit
#[cfg(not(feature = "metrics"))]
pub fn record_partial_commit() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_never_panics() {
        record_store_call("pk", std::time::Duration::from_millis(3));
        record_slow_query("pk");
        record_cache_lookup("l1", true);
        record_cache_lookup("l2", false);
        record_cache_error();
        record_partial_commit();
    }
}
