//! Tracing subscriber setup.
//!
//! Installs a global `tracing` subscriber with an env filter and either a
//! human-readable or a JSON formatting layer.

use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Guard returned by [`init_tracing`]. Logs the shutdown when dropped.
#[derive(Debug)]
pub struct TracingGuard {
    service_name: String,
    started: Instant,
}

impl TracingGuard {
    /// Service name the subscriber was installed for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        tracing::info!(
            service = %self.service_name,
            uptime_secs = self.started.elapsed().as_secs(),
            "[telemetry] shutting down"
        );
    }
}

/// Build the env filter for a configured level or directive string.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {}", config.log_level, e)))
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] when a global
/// subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<TracingGuard, TelemetryError> {
    let filter = env_filter(config)?;

    // JSON output for containers/production
    let json_layer = (config.console_output && config.json_logs).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    // Pretty output for development
    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "[telemetry] tracing initialized"
    );

    Ok(TracingGuard {
        service_name: config.service_name.clone(),
        started: Instant::now(),
    })
}
