//! # Core Entities
//!
//! Row values, primary keys, sharding keys and physical shard identity.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// VALUES AND ROWS
// =============================================================================

/// A single column value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// Integer view of the value, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Check for NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Compare two values of compatible types.
    ///
    /// Integers and floats compare numerically with each other. Values of
    /// unrelated types (and NULL) are incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => {
                write!(f, "x'")?;
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                write!(f, "'")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// One logical row: column name to value, ordered by column name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Set a column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Get a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Primary key of this row, read from `pk_field`.
    ///
    /// Returns `None` when the column is missing, NULL or not key-typed.
    pub fn pk(&self, pk_field: &str) -> Option<PkValue> {
        self.columns
            .get(pk_field)
            .and_then(|v| PkValue::try_from(v).ok())
    }

    /// Iterate columns in name order.
    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check for a row without columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// =============================================================================
// PRIMARY KEYS
// =============================================================================

/// Primary key value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PkValue {
    /// Integer key (the common case, required by the record iterator).
    Int(i64),
    /// Text key.
    Text(String),
}

impl PkValue {
    /// Integer view of the key.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PkValue::Int(v) => Some(*v),
            PkValue::Text(_) => None,
        }
    }
}

impl fmt::Display for PkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PkValue::Int(v) => write!(f, "{}", v),
            PkValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for PkValue {
    fn from(v: i64) -> Self {
        PkValue::Int(v)
    }
}

impl From<&str> for PkValue {
    fn from(v: &str) -> Self {
        PkValue::Text(v.to_string())
    }
}

impl From<String> for PkValue {
    fn from(v: String) -> Self {
        PkValue::Text(v)
    }
}

impl From<PkValue> for Value {
    fn from(pk: PkValue) -> Self {
        match pk {
            PkValue::Int(v) => Value::Int(v),
            PkValue::Text(v) => Value::Text(v),
        }
    }
}

impl TryFrom<&Value> for PkValue {
    type Error = ();

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(v) => Ok(PkValue::Int(*v)),
            Value::Text(v) => Ok(PkValue::Text(v.clone())),
            _ => Err(()),
        }
    }
}

// =============================================================================
// SHARDING KEYS
// =============================================================================

/// Value that positions an entity in the hash space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShardingValue {
    /// Numeric sharding value, used directly (sign bit masked).
    Int(i64),
    /// Text sharding value, hashed by the cluster's hash algorithm.
    Text(String),
}

impl fmt::Display for ShardingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardingValue::Int(v) => write!(f, "{}", v),
            ShardingValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ShardingValue {
    fn from(v: i64) -> Self {
        ShardingValue::Int(v)
    }
}

impl From<&str> for ShardingValue {
    fn from(v: &str) -> Self {
        ShardingValue::Text(v.to_string())
    }
}

impl From<String> for ShardingValue {
    fn from(v: String) -> Self {
        ShardingValue::Text(v)
    }
}

/// Sharding key: the cluster plus the value that picks the shard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardingKey {
    cluster: String,
    value: ShardingValue,
}

impl ShardingKey {
    /// Create a sharding key.
    pub fn new(cluster: impl Into<String>, value: impl Into<ShardingValue>) -> Self {
        Self {
            cluster: cluster.into(),
            value: value.into(),
        }
    }

    /// Cluster name.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Sharding value.
    pub fn value(&self) -> &ShardingValue {
        &self.value
    }
}

impl fmt::Display for ShardingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.cluster, self.value)
    }
}

// =============================================================================
// SHARD IDENTITY
// =============================================================================

/// Stable identity of one physical table.
///
/// Used as the cache key prefix and to dedup resources inside a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardSignature {
    /// Cluster name.
    pub cluster: String,
    /// Physical database name of the endpoint.
    pub database: String,
    /// Logical table name.
    pub table: String,
    /// Table index, `None` for global tables.
    pub table_index: Option<usize>,
}

impl ShardSignature {
    /// Signature of a sharded table.
    pub fn sharded(
        cluster: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
        table_index: usize,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            database: database.into(),
            table: table.into(),
            table_index: Some(table_index),
        }
    }

    /// Signature of a global table.
    pub fn global(
        cluster: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            database: database.into(),
            table: table.into(),
            table_index: None,
        }
    }

    /// Physical table name: `table_<index>` for shards, `table` for globals.
    pub fn physical_table(&self) -> String {
        match self.table_index {
            Some(index) => format!("{}_{}", self.table, index),
            None => self.table.clone(),
        }
    }

    /// Check for a global table.
    pub fn is_global(&self) -> bool {
        self.table_index.is_none()
    }
}

impl fmt::Display for ShardSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.cluster,
            self.database,
            self.physical_table()
        )
    }
}
