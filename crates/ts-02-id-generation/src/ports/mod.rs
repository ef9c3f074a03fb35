//! # Ports Module
//!
//! Outbound port to the coordination service.

pub mod outbound;

pub use outbound::CoordinationClient;
