//! # Task Executor Service
//!
//! Runs a [`RecordTask`] over every row of an entity.
//!
//! ```text
//! sharded:  reader job per master shard ──▶ batch job ──▶ batch job ...
//!           (all on the worker pool)
//! global:   caller thread reads ──▶ batch job ──▶ batch job ...
//! ```
//!
//! The returned [`TaskHandle`] reports progress and completion; `execute`
//! does not wait for the run.

use crate::adapters::ShardSource;
use crate::algorithms::RecordIterator;
use crate::config::ExecutorConfig;
use crate::domain::{TaskError, TaskHandle, TaskProgress};
use crate::ports::{RecordSource, RecordTask};
use rayon::{ThreadPool, ThreadPoolBuilder};
use shared_types::{EntityDescriptor, Query, Row};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};
use ts_01_routing::{ReadTarget, ShardRouter};
use ts_04_transactions::TransactionCoordinator;

/// Parallel batch executor.
pub struct TaskExecutor {
    router: Arc<ShardRouter>,
    coordinator: TransactionCoordinator,
    config: ExecutorConfig,
    pool: Arc<ThreadPool>,
}

impl TaskExecutor {
    /// Create an executor with its own worker pool.
    pub fn new(
        router: Arc<ShardRouter>,
        coordinator: TransactionCoordinator,
        config: ExecutorConfig,
    ) -> Result<Self, TaskError> {
        config.validate()?;
        let threads = config.resolved_threads();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tessera-task-{}", i))
            .build()
            .map_err(|e| TaskError::Pool(e.to_string()))?;
        info!(threads, step = config.default_step, "[executor] worker pool started");
        Ok(Self {
            router,
            coordinator,
            config,
            pool: Arc::new(pool),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `task` over every row of `entity` matching `filter`.
    pub fn execute(
        &self,
        entity: &EntityDescriptor,
        task: Arc<dyn RecordTask>,
        filter: Option<Query>,
    ) -> Result<TaskHandle, TaskError> {
        task.init()?;
        let step = task.batch_size().unwrap_or(self.config.default_step);

        if entity.is_sharded() {
            let decisions =
                self.router
                    .all_master_shards(&entity.cluster, &entity.table, entity.table_count)?;
            let mut iterators = Vec::with_capacity(decisions.len());
            for decision in decisions {
                let source = ShardSource::new(decision, self.coordinator.clone());
                iterators.push(RecordIterator::new(
                    Box::new(source),
                    &entity.primary_key,
                    filter.clone(),
                    step,
                )?);
            }
            debug!(entity = %entity.name, shards = iterators.len(), step, "[executor] sharded run");
            self.run_parallel(iterators, task)
        } else {
            let decision =
                self.router
                    .route_global(&entity.cluster, &entity.table, ReadTarget::Master)?;
            let source: Box<dyn RecordSource> =
                Box::new(ShardSource::new(decision, self.coordinator.clone()));
            let iterator = RecordIterator::new(source, &entity.primary_key, filter, step)?;
            debug!(entity = %entity.name, step, "[executor] global run");
            self.run_sequential(iterator, task)
        }
    }

    /// Run `task` over prepared iterators, one reader job per iterator.
    ///
    /// `RecordTask::init` is not called here.
    pub fn run_parallel(
        &self,
        mut iterators: Vec<RecordIterator>,
        task: Arc<dyn RecordTask>,
    ) -> Result<TaskHandle, TaskError> {
        let mut total = 0u64;
        for iterator in iterators.iter_mut() {
            total += iterator.count()?;
        }
        let progress = TaskProgress::new(task, total, iterators.len());
        let handle = TaskHandle::new(Arc::clone(&progress));

        if iterators.is_empty() {
            progress.try_complete();
            return Ok(handle);
        }
        for iterator in iterators {
            let progress = Arc::clone(&progress);
            let pool = Arc::clone(&self.pool);
            self.pool
                .spawn(move || read_all(iterator, &progress, &pool));
        }
        Ok(handle)
    }

    /// Run `task` over one iterator read on the caller thread.
    ///
    /// Returns once every batch has been submitted.
    pub fn run_sequential(
        &self,
        mut iterator: RecordIterator,
        task: Arc<dyn RecordTask>,
    ) -> Result<TaskHandle, TaskError> {
        let total = iterator.count()?;
        let progress = TaskProgress::new(task, total, 1);
        let handle = TaskHandle::new(Arc::clone(&progress));
        read_all(iterator, &progress, &self.pool);
        Ok(handle)
    }
}

impl std::fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("config", &self.config)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

/// Reader loop: scan every window and submit one job per batch.
fn read_all(mut iterator: RecordIterator, progress: &Arc<TaskProgress>, pool: &Arc<ThreadPool>) {
    loop {
        if progress.is_cancelled() {
            debug!(source = %iterator.describe(), "[executor] reader stopped by cancel");
            break;
        }
        let batch = match iterator.has_next().and_then(|more| {
            if more {
                iterator.next_batch().map(Some)
            } else {
                Ok(None)
            }
        }) {
            Ok(Some(batch)) => batch,
            Ok(None) => break,
            Err(e) => {
                warn!(source = %iterator.describe(), error = %e, "[executor] scan failed, reader stopped");
                break;
            }
        };
        progress.batch_submitted();
        let job_progress = Arc::clone(progress);
        pool.spawn(move || run_batch(&job_progress, batch));
    }
    progress.producer_finished();
}

fn run_batch(progress: &TaskProgress, batch: Vec<Row>) {
    if progress.is_cancelled() {
        progress.batch_dropped();
        return;
    }
    let task = progress.task();
    let rows = batch.len() as u64;
    let failed = match catch_unwind(AssertUnwindSafe(|| task.process_batch(&batch))) {
        Ok(Ok(())) => false,
        Ok(Err(e)) => {
            warn!(rows, error = %e, "[executor] batch failed");
            true
        }
        Err(_) => {
            warn!(rows, "[executor] batch panicked");
            true
        }
    };
    task.after_batch();
    progress.batch_finished(rows, failed);
}
