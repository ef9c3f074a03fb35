//! # Ports Module
//!
//! Capability trait the coordinator drives.

pub mod outbound;

pub use outbound::TransactionalResource;
