//! # Cache Keys
//!
//! Every cache entry lives under a [`CacheScope`]: one physical shard table,
//! or one global table of a cluster.
//!
//! ## Key Layout
//!
//! | Entry | Key |
//! |-------|-----|
//! | Row | `row:<scope>:<pk>` |
//! | Count | `count:<scope>` |
//! | Generation | `gen:<cluster>.<table>` |
//! | Query | `query:<generation>:<scope>:<normalized predicate>` |
//!
//! Primary keys are tagged with their type (`i:` or `s:`) so integer `1` and
//! text `"1"` never share an entry.

use serde::{Deserialize, Serialize};
use shared_types::{PkValue, ShardSignature};
use std::fmt;

/// Namespace of a cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheScope {
    /// One physical shard table.
    Shard(ShardSignature),
    /// A global table of a cluster.
    Global {
        /// Cluster name.
        cluster: String,
        /// Table name.
        table: String,
    },
}

impl CacheScope {
    /// Scope of a shard table.
    pub fn shard(signature: ShardSignature) -> Self {
        CacheScope::Shard(signature)
    }

    /// Scope of a global table.
    pub fn global(cluster: impl Into<String>, table: impl Into<String>) -> Self {
        CacheScope::Global {
            cluster: cluster.into(),
            table: table.into(),
        }
    }

    /// Owning cluster.
    pub fn cluster(&self) -> &str {
        match self {
            CacheScope::Shard(sig) => &sig.cluster,
            CacheScope::Global { cluster, .. } => cluster,
        }
    }

    /// Logical table name.
    pub fn table(&self) -> &str {
        match self {
            CacheScope::Shard(sig) => &sig.table,
            CacheScope::Global { table, .. } => table,
        }
    }
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheScope::Shard(sig) => write!(f, "{}", sig),
            CacheScope::Global { cluster, table } => write!(f, "{}.global.{}", cluster, table),
        }
    }
}

fn pk_tag(pk: &PkValue) -> String {
    match pk {
        PkValue::Int(v) => format!("i:{}", v),
        PkValue::Text(v) => format!("s:{}", v),
    }
}

/// Key of a cached row.
pub fn row_key(scope: &CacheScope, pk: &PkValue) -> String {
    format!("row:{}:{}", scope, pk_tag(pk))
}

/// Key of a cached row count.
pub fn count_key(scope: &CacheScope) -> String {
    format!("count:{}", scope)
}

/// Key of the query-result generation counter of a logical table.
pub fn generation_key(cluster: &str, table: &str) -> String {
    format!("gen:{}.{}", cluster, table)
}

/// Key of a cached query result under a generation.
pub fn query_key(generation: u64, scope: &CacheScope, normalized: &str) -> String {
    format!("query:{}:{}:{}", generation, scope, normalized)
}
