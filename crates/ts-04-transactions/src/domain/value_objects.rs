//! # Value Objects
//!
//! Transaction ids and the transaction state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transaction identifier, used in log spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying uuid.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction state.
///
/// ```text
/// NoTransaction ──begin──▶ Active ──commit──▶ Committing ──▶ Committed
///                            │                    │
///                            │                    ├──▶ PartiallyCommitted
///                            └──rollback──────────┴──▶ RolledBack
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Created, not begun.
    #[default]
    NoTransaction,
    /// Accepting enlistments.
    Active,
    /// Committing resources in enlistment order.
    Committing,
    /// Every resource committed.
    Committed,
    /// At least one resource committed, then one failed.
    PartiallyCommitted,
    /// Nothing committed.
    RolledBack,
}

impl TransactionState {
    /// Check if transition to next state is valid.
    pub fn can_transition_to(&self, next: TransactionState) -> bool {
        matches!(
            (self, next),
            (Self::NoTransaction, Self::Active)
                | (Self::Active, Self::Committing)
                | (Self::Active, Self::RolledBack)
                | (Self::Committing, Self::Committed)
                | (Self::Committing, Self::PartiallyCommitted)
                | (Self::Committing, Self::RolledBack)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Committed | Self::PartiallyCommitted | Self::RolledBack
        )
    }
}
