//! # Record Iterator
//!
//! Walks one table in primary-key windows:
//!
//! ```text
//! max_id = pk of  ORDER BY pk DESC LIMIT 1     (snapshot, once)
//!
//! [0, step) [step, 2·step) ... [k·step, (k+1)·step)    while latest <= max_id
//!    rows      (empty, skipped)      rows
//! ```
//!
//! Each window is `pk >= latest AND pk < latest + step AND <filter>`.
//! Empty windows are skipped inside one `has_next` call, so sparse key
//! ranges never surface as empty batches. Rows inserted above the snapshot
//! are not visited.
//!
//! Single owner. Not shared between threads.

use crate::domain::TaskError;
use crate::ports::RecordSource;
use shared_types::{Condition, Order, Query, Row};
use tracing::{debug, trace};

/// Default window width.
pub const DEFAULT_STEP: u64 = 2000;

/// Windowed scan over one record source.
pub struct RecordIterator {
    source: Box<dyn RecordSource>,
    pk_field: String,
    filter: Query,
    step: u64,
    /// `None` when the table was empty at construction.
    max_id: Option<i64>,
    latest: i64,
    /// The last window reached the top of the key space.
    exhausted: bool,
    buffer: Vec<Row>,
}

impl RecordIterator {
    /// Create an iterator and snapshot the highest primary key.
    pub fn new(
        mut source: Box<dyn RecordSource>,
        pk_field: impl Into<String>,
        filter: Option<Query>,
        step: u64,
    ) -> Result<Self, TaskError> {
        if step == 0 {
            return Err(TaskError::InvalidConfig("step must be at least 1".to_string()));
        }
        let pk_field = pk_field.into();
        let highest = source.select(&Query::new().order_by(&pk_field, Order::Desc).limit(1))?;
        let max_id = match highest.first() {
            Some(row) => Some(int_pk(row, &pk_field, source.as_ref())?),
            None => None,
        };
        debug!(source = %source.describe(), max_id = ?max_id, step, "[iterator] created");
        Ok(Self {
            source,
            pk_field,
            filter: filter.map(|q| q.filter_only()).unwrap_or_default(),
            step,
            max_id,
            latest: 0,
            exhausted: false,
            buffer: Vec::new(),
        })
    }

    /// Highest primary key seen at construction.
    pub fn max_id(&self) -> Option<i64> {
        self.max_id
    }

    /// Window width.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Description of the scanned source.
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Check for more rows, scanning forward until a window yields rows or
    /// the snapshot is passed.
    pub fn has_next(&mut self) -> Result<bool, TaskError> {
        let Some(max_id) = self.max_id else {
            return Ok(false);
        };
        let step = i64::try_from(self.step).unwrap_or(i64::MAX);
        while self.buffer.is_empty() && !self.exhausted && self.latest <= max_id {
            let high = self.latest.saturating_add(step);
            let window = self
                .filter
                .with_conditions([
                    Condition::gte(self.pk_field.as_str(), self.latest),
                    Condition::lt(self.pk_field.as_str(), high),
                ])
                .order_by(self.pk_field.as_str(), Order::Asc);
            self.buffer = self.source.select(&window)?;
            trace!(
                source = %self.source.describe(),
                from = self.latest,
                to = high,
                rows = self.buffer.len(),
                "[iterator] window scanned"
            );
            self.exhausted = high == i64::MAX;
            self.latest = high;
        }
        Ok(!self.buffer.is_empty())
    }

    /// Take the buffered batch, scanning for one if the buffer is empty.
    ///
    /// Returns an empty batch once the scan is exhausted.
    pub fn next_batch(&mut self) -> Result<Vec<Row>, TaskError> {
        if self.buffer.is_empty() {
            self.has_next()?;
        }
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Number of rows matching the filter, counted independently of the scan.
    pub fn count(&mut self) -> Result<u64, TaskError> {
        self.source.count(&self.filter)
    }
}

impl std::fmt::Debug for RecordIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordIterator")
            .field("source", &self.source.describe())
            .field("max_id", &self.max_id)
            .field("latest", &self.latest)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

fn int_pk(row: &Row, pk_field: &str, source: &dyn RecordSource) -> Result<i64, TaskError> {
    row.get(pk_field)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| TaskError::NonIntegerKey {
            source_name: source.describe(),
            field: pk_field.to_string(),
        })
}
