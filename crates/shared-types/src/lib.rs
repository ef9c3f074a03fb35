//! # Shared Types Crate
//!
//! Types that cross subsystem boundaries in Tessera.
//!
//! ## Contents
//!
//! - **Entities**: [`Value`], [`Row`], [`PkValue`], [`ShardingKey`],
//!   [`ShardSignature`].
//! - **Queries**: [`Query`] and [`Condition`], with a normalized textual form
//!   used as the second-level cache key.
//! - **Metadata**: [`EntityDescriptor`] and the [`MetadataRegistry`] that is
//!   built once at startup and injected into every component.
//! - **Store ports**: [`StoreConnection`] and [`ConnectionPool`]. Rendering a
//!   [`Statement`] into SQL text belongs to the adapter behind these ports.
//! - **Adapters**: [`MemoryStore`], an in-process store used by tests and
//!   embedded deployments.

pub mod adapters;
pub mod entities;
pub mod errors;
pub mod metadata;
pub mod query;
pub mod store;

pub use adapters::{MemoryConnection, MemoryPool, MemoryStore};
pub use entities::*;
pub use errors::*;
pub use metadata::{EntityDescriptor, MetadataRegistry};
pub use query::{CompareOp, Condition, Order, Query};
pub use store::{ConnectionPool, Statement, StatementKind, StoreConnection, StoreOutcome};
