//! # Domain Module
//!
//! Cache scopes, key layout and errors.

pub mod errors;
pub mod keys;

pub use errors::*;
pub use keys::*;
