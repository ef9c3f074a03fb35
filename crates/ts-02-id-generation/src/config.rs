//! # Id Generator Configuration

use crate::domain::IdGenerationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of ids reserved per refill.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default attempts before giving up on a transient failure.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Id generator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGeneratorConfig {
    /// Ids reserved per buffer refill.
    pub batch_size: usize,
    /// Attempts per allocation.
    pub max_attempts: u32,
    /// First retry delay; doubles on every further attempt.
    pub backoff_base: Duration,
    /// Upper bound on a single retry delay.
    pub backoff_max: Duration,
    /// Wait limit for the counter mutex.
    pub mutex_timeout: Duration,
}

impl Default for IdGeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(50),
            backoff_max: Duration::from_secs(2),
            mutex_timeout: Duration::from_secs(5),
        }
    }
}

impl IdGeneratorConfig {
    /// Create a config for testing (no real sleeping).
    pub fn for_testing() -> Self {
        Self {
            backoff_base: Duration::from_millis(1),
            backoff_max: Duration::from_millis(4),
            mutex_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Builder-style method to set the refill batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder-style method to set the attempt limit.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Builder-style method to set the backoff base.
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Builder-style method to set the mutex timeout.
    pub fn with_mutex_timeout(mut self, mutex_timeout: Duration) -> Self {
        self.mutex_timeout = mutex_timeout;
        self
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff_base
            .checked_mul(factor)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), IdGenerationError> {
        if self.batch_size == 0 {
            return Err(IdGenerationError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(IdGenerationError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.mutex_timeout.is_zero() {
            return Err(IdGenerationError::InvalidConfig(
                "mutex_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IdGeneratorConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.max_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = IdGeneratorConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(50));
        assert_eq!(config.backoff(2), Duration::from_millis(100));
        assert_eq!(config.backoff(3), Duration::from_millis(200));
        assert_eq!(config.backoff(30), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_config() {
        assert!(IdGeneratorConfig::default()
            .with_batch_size(0)
            .validate()
            .is_err());
        assert!(IdGeneratorConfig::default()
            .with_max_attempts(0)
            .validate()
            .is_err());
    }
}
