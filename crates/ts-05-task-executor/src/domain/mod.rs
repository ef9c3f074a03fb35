//! # Domain Module
//!
//! Task progress, completion handle and errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
