//! Worker Pool
//!
//! Fixed set of named worker threads sharing one queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{RelayError, Result};
use crate::executor::Execute;
use crate::storage::ResultStore;
use crate::task::TaskQueue;

use super::{PoolStats, StatsSnapshot, Worker};

/// Owns the worker threads
///
/// Workers run until the queue is closed; `shutdown` closes it and joins.
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    handles: Vec<JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Spawn `count` workers named `worker-1` … `worker-{count}`
    pub fn spawn(
        count: usize,
        queue: Arc<TaskQueue>,
        executor: Arc<dyn Execute>,
        store: Arc<ResultStore>,
    ) -> Result<Self> {
        if count == 0 {
            return Err(RelayError::Config(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        let stats = Arc::new(PoolStats::default());
        let mut handles = Vec::with_capacity(count);

        for i in 1..=count {
            let name = format!("worker-{}", i);
            let worker = Worker::new(
                name.clone(),
                Arc::clone(&queue),
                Arc::clone(&executor),
                Arc::clone(&store),
                Arc::clone(&stats),
            );
            let handle = thread::Builder::new()
                .name(name)
                .spawn(move || worker.run())?;
            handles.push(handle);
        }

        tracing::info!("Started {} workers", count);

        Ok(Self {
            queue,
            handles,
            stats,
        })
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Close the queue, drop pending tasks, and wait for every worker to
    /// finish its current task
    pub fn shutdown(self) {
        let dropped = self.queue.close();
        if dropped > 0 {
            tracing::warn!(dropped, "pending tasks dropped at shutdown");
        }
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked outside task processing");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}
