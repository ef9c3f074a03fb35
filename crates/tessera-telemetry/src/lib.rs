//! # Tessera Telemetry
//!
//! Log output for Tessera services.
//!
//! Every crate in the workspace logs through `tracing` with structured
//! fields (`cluster`, `table`, `tx_id`, ...) and a `[component]` message
//! prefix. This crate installs the subscriber that renders those events.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_tracing(&config)?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TESSERA_SERVICE_NAME` | `tessera` | Service name in log events |
//! | `TESSERA_LOG_LEVEL` / `RUST_LOG` | `info` | Log level or filter directive |
//! | `TESSERA_CONSOLE_OUTPUT` | `true` | Write events to stdout |
//! | `TESSERA_JSON_LOGS` | `false` (`true` in containers) | JSON formatting |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use tracing_setup::{env_filter, init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Tracing already initialized: {0}")]
    AlreadyInitialized(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience macro for creating a span with component context.
///
/// # Example
///
/// ```rust,ignore
/// use tessera_telemetry::component_span;
///
/// let _span = component_span!("commit", component = "transactions", tx_id = %id).entered();
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
