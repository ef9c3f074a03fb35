//! # Domain Module
//!
//! Entity keys, query kinds and the facade error.

pub mod errors;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
