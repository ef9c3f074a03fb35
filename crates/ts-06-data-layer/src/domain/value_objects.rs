//! # Value Objects

use serde::{Deserialize, Serialize};
use shared_types::ShardingKey;
use std::fmt;

/// Selects global or sharded routing for a call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    /// The entity's single global table.
    Global,
    /// The shard the key hashes to.
    Sharded(ShardingKey),
}

impl EntityKey {
    /// Sharded key shorthand.
    pub fn sharded(key: ShardingKey) -> Self {
        EntityKey::Sharded(key)
    }

    /// Check for a sharded key.
    pub fn is_sharded(&self) -> bool {
        matches!(self, EntityKey::Sharded(_))
    }
}

impl From<ShardingKey> for EntityKey {
    fn from(key: ShardingKey) -> Self {
        EntityKey::Sharded(key)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Global => write!(f, "global"),
            EntityKey::Sharded(key) => write!(f, "{}:{:?}", key.cluster(), key.value()),
        }
    }
}

/// Kind of store call, for slow-query thresholds and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Row count.
    Count,
    /// Single primary-key lookup.
    Pk,
    /// Multi primary-key lookup.
    Pks,
    /// Predicate query.
    Query,
    /// Writes and iterator windows.
    Scan,
}

impl QueryKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Count => "count",
            QueryKind::Pk => "pk",
            QueryKind::Pks => "pks",
            QueryKind::Query => "query",
            QueryKind::Scan => "scan",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
