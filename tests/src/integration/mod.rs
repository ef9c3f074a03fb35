//! # Integration Scenarios
//!
//! Flows that cross subsystem boundaries: routing into storage, the
//! facade into caches and transactions, and the executor over real shards.

pub mod routing_flows;
pub mod storage_flows;
pub mod task_flows;
pub mod transaction_flows;
