//! # Algorithms Module
//!
//! Commit protocol for transactions spanning several shards.

pub mod one_phase_commit;

pub use one_phase_commit::Transaction;
