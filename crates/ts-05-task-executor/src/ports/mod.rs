//! # Ports Module
//!
//! - [`RecordTask`]: caller-supplied batch processing
//! - [`RecordSource`]: one table the iterator scans

pub mod inbound;
pub mod outbound;

pub use inbound::RecordTask;
pub use outbound::RecordSource;
