//! # Algorithms Module
//!
//! Windowed primary-key scan.

pub mod record_iterator;

pub use record_iterator::{RecordIterator, DEFAULT_STEP};
