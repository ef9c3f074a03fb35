//! # Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of every counter node.
pub const ID_ROOT: &str = "/idgen";

/// Identity of one id sequence: (cluster, name).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdKey {
    /// Cluster name.
    pub cluster: String,
    /// Sequence name, usually the table name.
    pub name: String,
}

impl IdKey {
    /// Create a key.
    pub fn new(cluster: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            name: name.into(),
        }
    }

    /// Counter node path: `/idgen/<cluster>/<name>`.
    pub fn counter_path(&self) -> String {
        format!("{}/{}/{}", ID_ROOT, self.cluster, self.name)
    }

    /// Mutex path scoped to the counter node.
    pub fn mutex_path(&self) -> String {
        format!("{}/_mutex", self.counter_path())
    }
}

impl fmt::Display for IdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.name)
    }
}

/// Proof of holding a coordination mutex.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MutexLease {
    /// Mutex path.
    pub path: String,
    /// Holder token issued by the coordination service.
    pub token: u64,
}
