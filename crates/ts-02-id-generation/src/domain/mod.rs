//! # Domain Module
//!
//! Core domain types for id generation.

pub mod errors;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
