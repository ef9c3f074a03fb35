//! # In-Memory Coordinator
//!
//! Versioned nodes and blocking mutexes held in process memory.
//!
//! Several generators sharing one `Arc<InMemoryCoordinator>` behave like
//! separate processes talking to the same coordination service. Fault
//! injection (`set_available`, `fail_next`) drives the retry paths.

use crate::domain::{CoordinationError, MutexLease};
use crate::ports::CoordinationClient;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Node {
    data: Vec<u8>,
    version: u64,
}

/// In-memory coordination service.
#[derive(Debug)]
pub struct InMemoryCoordinator {
    nodes: Mutex<HashMap<String, Node>>,
    /// Mutex path to holder token.
    mutexes: Mutex<HashMap<String, u64>>,
    released: Condvar,
    next_token: AtomicU64,
    available: AtomicBool,
    failures: AtomicU32,
}

impl Default for InMemoryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
            mutexes: Mutex::new(HashMap::new()),
            released: Condvar::new(),
            next_token: AtomicU64::new(1),
            available: AtomicBool::new(true),
            failures: AtomicU32::new(0),
        }
    }

    /// Toggle availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Fail the next `n` calls with `Unavailable`.
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Seed or overwrite a node, bumping its version.
    pub fn put(&self, path: &str, data: &[u8]) {
        let mut nodes = self.nodes.lock();
        let node = nodes.entry(path.to_string()).or_insert(Node {
            data: Vec::new(),
            version: 0,
        });
        node.data = data.to_vec();
        node.version += 1;
    }

    /// Check whether a mutex is currently held.
    pub fn is_locked(&self, path: &str) -> bool {
        self.mutexes.lock().contains_key(path)
    }

    fn check(&self, op: &str) -> Result<(), CoordinationError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(CoordinationError::Unavailable(format!("{} refused", op)));
        }
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(CoordinationError::Unavailable(format!(
                "{} failed (injected)",
                op
            )));
        }
        Ok(())
    }
}

impl CoordinationClient for InMemoryCoordinator {
    fn create_if_absent(&self, path: &str, data: &[u8]) -> Result<bool, CoordinationError> {
        self.check("create")?;
        let mut nodes = self.nodes.lock();
        if nodes.contains_key(path) {
            return Ok(false);
        }
        nodes.insert(
            path.to_string(),
            Node {
                data: data.to_vec(),
                version: 0,
            },
        );
        Ok(true)
    }

    fn read(&self, path: &str) -> Result<(Vec<u8>, u64), CoordinationError> {
        self.check("read")?;
        self.nodes
            .lock()
            .get(path)
            .map(|node| (node.data.clone(), node.version))
            .ok_or_else(|| CoordinationError::NoNode(path.to_string()))
    }

    fn write_if_version(
        &self,
        path: &str,
        data: &[u8],
        version: u64,
    ) -> Result<(), CoordinationError> {
        self.check("write")?;
        let mut nodes = self.nodes.lock();
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| CoordinationError::NoNode(path.to_string()))?;
        if node.version != version {
            return Err(CoordinationError::VersionConflict {
                path: path.to_string(),
                expected: version,
                actual: node.version,
            });
        }
        node.data = data.to_vec();
        node.version += 1;
        Ok(())
    }

    fn acquire_mutex(&self, path: &str, timeout: Duration) -> Result<MutexLease, CoordinationError> {
        self.check("acquire")?;
        let deadline = Instant::now() + timeout;
        let mut mutexes = self.mutexes.lock();
        while mutexes.contains_key(path) {
            if self.released.wait_until(&mut mutexes, deadline).timed_out()
                && mutexes.contains_key(path)
            {
                return Err(CoordinationError::LockTimeout(path.to_string()));
            }
        }
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        mutexes.insert(path.to_string(), token);
        Ok(MutexLease {
            path: path.to_string(),
            token,
        })
    }

    fn release_mutex(&self, lease: MutexLease) -> Result<(), CoordinationError> {
        // Not subject to fault injection.
        let mut mutexes = self.mutexes.lock();
        match mutexes.get(&lease.path) {
            Some(token) if *token == lease.token => {
                mutexes.remove(&lease.path);
                drop(mutexes);
                self.released.notify_all();
                Ok(())
            }
            _ => Err(CoordinationError::InvalidLease(lease.path)),
        }
    }
}
