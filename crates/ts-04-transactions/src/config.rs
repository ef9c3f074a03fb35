//! # Transaction Configuration

use crate::domain::TransactionError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default transaction timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transaction coordinator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Age after which `commit` rolls back instead; `None` disables it.
    pub timeout: Option<Duration>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl TransactionConfig {
    /// Builder-style method to set the timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(TransactionError::InvalidConfig(
                "timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
