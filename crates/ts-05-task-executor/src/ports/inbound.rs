//! # Inbound Ports
//!
//! Work the executor drives over every scanned batch.

use crate::domain::TaskError;
use shared_types::Row;

/// A task applied to every row of an entity, one batch at a time.
///
/// Batches run concurrently on the worker pool, so implementations keep
/// their own state behind locks or atomics.
pub trait RecordTask: Send + Sync {
    /// Called once before any batch is read. An error aborts the run.
    fn init(&self) -> Result<(), TaskError> {
        Ok(())
    }

    /// Rows per scan window; `None` uses the executor's default step.
    fn batch_size(&self) -> Option<u64> {
        None
    }

    /// Process one batch. An error is logged and counted; the run continues.
    fn process_batch(&self, rows: &[Row]) -> Result<(), TaskError>;

    /// Called after every batch, failed or not.
    fn after_batch(&self) {}

    /// Called once when the run completes or is cancelled.
    fn finish(&self) {}
}
