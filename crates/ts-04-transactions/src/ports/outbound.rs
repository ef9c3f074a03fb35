//! # Outbound Ports
//!
//! The coordinator only ever talks to resources through
//! [`TransactionalResource`]; it never inspects the concrete type.

use crate::domain::TransactionError;
use shared_types::{ShardSignature, StoreConnection, StoreError};

/// A resource that can take part in a transaction.
pub trait TransactionalResource: Send {
    /// Human-readable description for logs and errors.
    fn describe(&self) -> String;

    /// Identity of the physical table. Enlistment dedups on it.
    fn signature(&self) -> &ShardSignature;

    /// Borrow the live connection. Fails once the resource is closed.
    fn connection(&mut self) -> Result<&mut dyn StoreConnection, TransactionError>;

    /// Commit the local transaction.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Roll back the local transaction.
    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Release the connection. Idempotent.
    fn close(&mut self);

    /// Check whether the connection was released.
    fn is_closed(&self) -> bool;
}
