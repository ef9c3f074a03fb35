//! # Executor Configuration

use crate::algorithms::DEFAULT_STEP;
use crate::domain::TaskError;
use serde::{Deserialize, Serialize};

/// Task executor configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Worker threads; 0 uses one per available core.
    pub worker_threads: usize,
    /// Scan window width when the task does not choose one.
    pub default_step: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            default_step: DEFAULT_STEP,
        }
    }
}

impl ExecutorConfig {
    /// Create a config for testing (small pool).
    pub fn for_testing() -> Self {
        Self {
            worker_threads: 2,
            ..Self::default()
        }
    }

    /// Builder-style method to set the worker count.
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    /// Builder-style method to set the default window width.
    pub fn with_default_step(mut self, default_step: u64) -> Self {
        self.default_step = default_step;
        self
    }

    /// Worker count after resolving 0 to the core count.
    pub fn resolved_threads(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.default_step == 0 {
            return Err(TaskError::InvalidConfig("default_step must be at least 1".to_string()));
        }
        Ok(())
    }
}
