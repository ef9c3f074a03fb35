//! # Ports Module
//!
//! - Inbound: [`PrimaryCache`] (rows and counts), [`SecondCache`] (query results)
//! - Outbound: [`CacheTransport`] (byte-level key/value backend)

pub mod inbound;
pub mod outbound;

pub use inbound::{PrimaryCache, QueryLookup, SecondCache};
pub use outbound::CacheTransport;
