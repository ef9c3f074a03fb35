//! # Id Generator Service
//!
//! Cluster-unique, per-key monotonic ids backed by a counter node in the
//! coordination service.
//!
//! ## Allocation
//!
//! ```text
//! acquire mutex(/idgen/<cluster>/<name>/_mutex)
//!   create_if_absent(counter, "0")
//!   (V, version) = read(counter)
//!   write_if_version(counter, V + n, version)
//! release mutex            (on every path, via LeaseGuard)
//! return V+1 ..= V+n
//! ```
//!
//! ## Local buffer
//!
//! `gen_id` pops from a per-key FIFO and refills `batch_size` ids only when
//! the buffer is empty. Pops share one short lock; refills are serialized by
//! a second per-key lock so that concurrent callers trigger one allocation.
//! Ids reserved by a process that dies are lost: uniqueness is guaranteed,
//! density is not.

use crate::config::IdGeneratorConfig;
use crate::domain::{CoordinationError, IdGenerationError, IdKey, MutexLease};
use crate::ports::CoordinationClient;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

#[derive(Default)]
struct KeyBuffer {
    ids: Mutex<VecDeque<i64>>,
    refill: Mutex<()>,
}

/// Releases the lease when dropped.
struct LeaseGuard<'a> {
    client: &'a dyn CoordinationClient,
    lease: Option<MutexLease>,
}

impl Drop for LeaseGuard<'_> {
    fn drop(&mut self) {
        if let Some(lease) = self.lease.take() {
            let path = lease.path.clone();
            if let Err(e) = self.client.release_mutex(lease) {
                warn!(path = %path, error = %e, "[idgen] mutex release failed");
            }
        }
    }
}

/// Distributed id generator.
pub struct IdGenerator {
    client: Arc<dyn CoordinationClient>,
    config: IdGeneratorConfig,
    buffers: Mutex<HashMap<IdKey, Arc<KeyBuffer>>>,
}

impl IdGenerator {
    /// Create a generator.
    pub fn new(
        client: Arc<dyn CoordinationClient>,
        config: IdGeneratorConfig,
    ) -> Result<Self, IdGenerationError> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            buffers: Mutex::new(HashMap::new()),
        })
    }

    /// Generator configuration.
    pub fn config(&self) -> &IdGeneratorConfig {
        &self.config
    }

    /// Next id for `(cluster, name)`, served from the local buffer.
    pub fn gen_id(&self, cluster: &str, name: &str) -> Result<i64, IdGenerationError> {
        let key = IdKey::new(cluster, name);
        let buffer = self.buffer(&key);

        if let Some(id) = buffer.ids.lock().pop_front() {
            return Ok(id);
        }

        let _refill = buffer.refill.lock();
        // Another caller may have refilled while we waited.
        if let Some(id) = buffer.ids.lock().pop_front() {
            return Ok(id);
        }

        let mut range = self.allocate(&key, self.config.batch_size)?;
        let first = range
            .next()
            .ok_or(IdGenerationError::InvalidBatchSize(self.config.batch_size))?;
        buffer.ids.lock().extend(range);
        debug!(key = %key, first, batch = self.config.batch_size, "[idgen] buffer refilled");
        Ok(first)
    }

    /// `n` fresh ids for `(cluster, name)`, allocated directly.
    pub fn gen_id_batch(
        &self,
        cluster: &str,
        name: &str,
        n: usize,
    ) -> Result<Vec<i64>, IdGenerationError> {
        if n == 0 {
            return Err(IdGenerationError::InvalidBatchSize(n));
        }
        let key = IdKey::new(cluster, name);
        Ok(self.allocate(&key, n)?.collect())
    }

    /// Ids currently buffered for a key.
    pub fn buffered(&self, cluster: &str, name: &str) -> usize {
        self.buffers
            .lock()
            .get(&IdKey::new(cluster, name))
            .map(|b| b.ids.lock().len())
            .unwrap_or(0)
    }

    fn buffer(&self, key: &IdKey) -> Arc<KeyBuffer> {
        let mut buffers = self.buffers.lock();
        Arc::clone(buffers.entry(key.clone()).or_default())
    }

    /// Reserve `n` ids, retrying transient failures with backoff.
    fn allocate(&self, key: &IdKey, n: usize) -> Result<RangeInclusive<i64>, IdGenerationError> {
        let mut last_error = None;
        for attempt in 1..=self.config.max_attempts {
            match self.try_allocate(key, n) {
                Ok(range) if !range.contains(&0) => return Ok(range),
                Ok(range) => {
                    warn!(key = %key, attempt, start = *range.start(), "[idgen] allocated range contains 0");
                    last_error = None;
                }
                Err(e) if e.is_transient() => {
                    warn!(key = %key, attempt, error = %e, "[idgen] allocation failed, retrying");
                    last_error = Some(e);
                }
                Err(e) => return Err(IdGenerationError::Coordination(e)),
            }
            if attempt < self.config.max_attempts {
                thread::sleep(self.config.backoff(attempt));
            }
        }

        let attempts = self.config.max_attempts;
        Err(match last_error {
            Some(last_error) => IdGenerationError::Exhausted {
                key: key.to_string(),
                attempts,
                last_error,
            },
            None => IdGenerationError::ZeroId {
                key: key.to_string(),
                attempts,
            },
        })
    }

    fn try_allocate(&self, key: &IdKey, n: usize) -> Result<RangeInclusive<i64>, CoordinationError> {
        let path = key.counter_path();
        let lease = self
            .client
            .acquire_mutex(&key.mutex_path(), self.config.mutex_timeout)?;
        let _guard = LeaseGuard {
            client: self.client.as_ref(),
            lease: Some(lease),
        };

        self.client.create_if_absent(&path, b"0")?;
        let (data, version) = self.client.read(&path)?;
        let current = parse_counter(&path, &data)?;
        let next = i64::try_from(n)
            .ok()
            .and_then(|n| current.checked_add(n))
            .ok_or_else(|| CoordinationError::Corrupt {
                path: path.clone(),
                reason: format!("counter {} overflows by {}", current, n),
            })?;
        self.client
            .write_if_version(&path, next.to_string().as_bytes(), version)?;

        Ok(current + 1..=next)
    }
}

fn parse_counter(path: &str, data: &[u8]) -> Result<i64, CoordinationError> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| CoordinationError::Corrupt {
            path: path.to_string(),
            reason: format!("not a decimal counter: {:?}", String::from_utf8_lossy(data)),
        })
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("config", &self.config)
            .field("keys", &self.buffers.lock().len())
            .finish()
    }
}
