//! # Outbound Ports

use crate::domain::TaskError;
use shared_types::{Query, Row};

/// One physical table the iterator can scan.
pub trait RecordSource: Send {
    /// Description for logs.
    fn describe(&self) -> String;

    /// Rows matching `query`.
    fn select(&mut self, query: &Query) -> Result<Vec<Row>, TaskError>;

    /// Number of rows matching `query`.
    fn count(&mut self, query: &Query) -> Result<u64, TaskError>;
}
