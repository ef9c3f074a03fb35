//! # Task Progress
//!
//! Shared run state and the caller's [`TaskHandle`].
//!
//! ## Completion
//!
//! A run is done when every producer (shard reader) has finished and no
//! batch is in flight. The row countdown seeded from the snapshot count is
//! reporting only; rows inserted during the scan can push it past zero
//! without holding the run open.

use crate::ports::RecordTask;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info};

/// Shared state of one executor run.
pub struct TaskProgress {
    task: Arc<dyn RecordTask>,
    total: u64,
    remaining: AtomicU64,
    processed: AtomicU64,
    failed_batches: AtomicU64,
    producers: AtomicUsize,
    inflight: AtomicUsize,
    cancelled: AtomicBool,
    completed: AtomicBool,
    done: Mutex<bool>,
    done_cv: Condvar,
    done_tx: watch::Sender<bool>,
    started: Instant,
}

impl TaskProgress {
    /// Create run state for `total` rows and `producers` readers.
    pub fn new(task: Arc<dyn RecordTask>, total: u64, producers: usize) -> Arc<Self> {
        let (done_tx, _) = watch::channel(false);
        Arc::new(Self {
            task,
            total,
            remaining: AtomicU64::new(total),
            processed: AtomicU64::new(0),
            failed_batches: AtomicU64::new(0),
            producers: AtomicUsize::new(producers),
            inflight: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            done: Mutex::new(false),
            done_cv: Condvar::new(),
            done_tx,
            started: Instant::now(),
        })
    }

    /// The task being run.
    pub fn task(&self) -> &Arc<dyn RecordTask> {
        &self.task
    }

    /// Check the cancel flag.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Register a batch about to be submitted.
    pub fn batch_submitted(&self) {
        self.inflight.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a finished batch of `rows` rows.
    pub fn batch_finished(&self, rows: u64, failed: bool) {
        let _ = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(rows)));
        self.processed.fetch_add(rows, Ordering::SeqCst);
        if failed {
            self.failed_batches.fetch_add(1, Ordering::SeqCst);
        }
        self.batch_released();
    }

    /// Release a batch slot without touching the counters.
    pub fn batch_dropped(&self) {
        self.batch_released();
    }

    /// Record a producer that has submitted its last batch.
    pub fn producer_finished(&self) {
        self.producers.fetch_sub(1, Ordering::SeqCst);
        self.try_complete();
    }

    fn batch_released(&self) {
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        self.try_complete();
    }

    /// Complete the run if nothing can produce or process more work.
    pub fn try_complete(&self) {
        if self.producers.load(Ordering::SeqCst) != 0 || self.inflight.load(Ordering::SeqCst) != 0 {
            return;
        }
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.task.finish();
        info!(
            total = self.total,
            processed = self.processed.load(Ordering::SeqCst),
            failed_batches = self.failed_batches.load(Ordering::SeqCst),
            cancelled = self.is_cancelled(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "[executor] task finished"
        );
        *self.done.lock() = true;
        self.done_cv.notify_all();
        self.done_tx.send_replace(true);
    }
}

/// Caller's view of a running task.
#[derive(Clone)]
pub struct TaskHandle {
    progress: Arc<TaskProgress>,
}

impl TaskHandle {
    /// Wrap shared run state.
    pub fn new(progress: Arc<TaskProgress>) -> Self {
        Self { progress }
    }

    /// Row count snapshotted at start.
    pub fn total(&self) -> u64 {
        self.progress.total
    }

    /// Rows of the snapshot not yet processed (never below zero).
    pub fn remaining(&self) -> u64 {
        self.progress.remaining.load(Ordering::SeqCst)
    }

    /// Rows handed to the task so far.
    pub fn processed(&self) -> u64 {
        self.progress.processed.load(Ordering::SeqCst)
    }

    /// Batches whose processing returned an error.
    pub fn failed_batches(&self) -> u64 {
        self.progress.failed_batches.load(Ordering::SeqCst)
    }

    /// Check whether the run has completed.
    pub fn is_done(&self) -> bool {
        *self.progress.done.lock()
    }

    /// Check whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.progress.is_cancelled()
    }

    /// Stop submitting batches. Batches already running complete.
    pub fn cancel(&self) {
        if !self.progress.cancelled.swap(true, Ordering::SeqCst) {
            debug!("[executor] cancel requested");
        }
    }

    /// Block until the run completes.
    pub fn wait(&self) {
        let mut done = self.progress.done.lock();
        while !*done {
            self.progress.done_cv.wait(&mut done);
        }
    }

    /// Block until the run completes or `timeout` passes. Returns `true` if
    /// the run completed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut done = self.progress.done.lock();
        while !*done {
            if self
                .progress
                .done_cv
                .wait_until(&mut done, deadline)
                .timed_out()
            {
                return *done;
            }
        }
        true
    }

    /// Wait for completion without blocking an async runtime thread.
    pub async fn wait_async(&self) {
        let mut rx = self.progress.done_tx.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("total", &self.total())
            .field("remaining", &self.remaining())
            .field("processed", &self.processed())
            .field("failed_batches", &self.failed_batches())
            .field("done", &self.is_done())
            .finish()
    }
}
