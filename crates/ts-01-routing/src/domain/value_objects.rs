//! # Value Objects
//!
//! Route decisions, read targets and hash algorithm selection.

use super::entities::DbEndpoint;
use serde::{Deserialize, Serialize};
use shared_types::ShardSignature;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Where an operation goes: the master or the `i`-th slave list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadTarget {
    /// Region (or global) master.
    #[default]
    Master,
    /// Slave list at this index.
    Slave(usize),
}

impl ReadTarget {
    /// Check for a slave target.
    pub fn is_slave(&self) -> bool {
        matches!(self, ReadTarget::Slave(_))
    }
}

impl fmt::Display for ReadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadTarget::Master => write!(f, "master"),
            ReadTarget::Slave(i) => write!(f, "slave[{}]", i),
        }
    }
}

/// Resolved physical location of one operation. Pure value.
#[derive(Clone, Debug)]
pub struct RouteDecision {
    /// Cluster name.
    pub cluster: String,
    /// Region index, `None` for global tables.
    pub region_index: Option<usize>,
    /// Target endpoint.
    pub endpoint: Arc<DbEndpoint>,
    /// Logical table name.
    pub table: String,
    /// Table index, `None` for global tables.
    pub table_index: Option<usize>,
}

impl RouteDecision {
    /// Physical table name (`table_<index>` or `table`).
    pub fn physical_table(&self) -> String {
        self.signature().physical_table()
    }

    /// Stable identity of the physical table.
    pub fn signature(&self) -> ShardSignature {
        match self.table_index {
            Some(index) => ShardSignature::sharded(
                &self.cluster,
                &self.endpoint.database,
                &self.table,
                index,
            ),
            None => ShardSignature::global(&self.cluster, &self.endpoint.database, &self.table),
        }
    }

    /// Check for a global-table decision.
    pub fn is_global(&self) -> bool {
        self.table_index.is_none()
    }
}

impl PartialEq for RouteDecision {
    fn eq(&self, other: &Self) -> bool {
        self.cluster == other.cluster
            && self.region_index == other.region_index
            && Arc::ptr_eq(&self.endpoint, &other.endpoint)
            && self.table == other.table
            && self.table_index == other.table_index
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region_index {
            Some(region) => write!(
                f,
                "{}[region {}] {}.{}",
                self.cluster,
                region,
                self.endpoint.name,
                self.physical_table()
            ),
            None => write!(
                f,
                "{}[global] {}.{}",
                self.cluster,
                self.endpoint.name,
                self.physical_table()
            ),
        }
    }
}

/// String hash used to place text sharding values.
///
/// Every algorithm is stable across restarts and platforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// `h = h * 33 + byte`, wrapping.
    #[default]
    Bernstein,
    /// 64-bit FNV-1a.
    Fnv1a,
    /// First 8 bytes of Keccak-256, big-endian.
    Keccak,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bernstein" => Ok(HashAlgorithm::Bernstein),
            "fnv1a" | "fnv" => Ok(HashAlgorithm::Fnv1a),
            "keccak" | "keccak256" => Ok(HashAlgorithm::Keccak),
            other => Err(format!("unknown hash algorithm: {}", other)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Bernstein => "bernstein",
            HashAlgorithm::Fnv1a => "fnv1a",
            HashAlgorithm::Keccak => "keccak",
        };
        f.write_str(name)
    }
}
