//! # Tessera Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Two-region cluster over in-memory stores
//! └── integration/      # Cross-subsystem scenarios
//!     ├── routing_flows.rs
//!     ├── storage_flows.rs
//!     ├── transaction_flows.rs
//!     └── task_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ts-tests
//!
//! # By category
//! cargo test -p ts-tests integration::storage_flows
//!
//! # Benchmarks
//! cargo bench -p ts-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
