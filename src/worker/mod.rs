//! Worker Module
//!
//! Long-lived workers that drain the shared task queue.
//!
//! ## Per-Task Steps
//! 1. Dequeue (blocks)
//! 2. Execute via the executor; errors and panics become error results
//! 3. Persist to both stores; the blob path is attached to the result
//! 4. Offer the result on the task's reply channel (never blocks)
//!
//! Nothing in steps 2–4 can end the loop. Only closing the queue does.

mod pool;
mod stats;

pub use pool::WorkerPool;
pub use stats::{PoolStats, StatsSnapshot};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::executor::Execute;
use crate::storage::ResultStore;
use crate::task::{Delivery, Task, TaskQueue, TaskRecord, TaskResult};

/// A single worker loop
pub struct Worker {
    name: String,
    queue: Arc<TaskQueue>,
    executor: Arc<dyn Execute>,
    store: Arc<ResultStore>,
    stats: Arc<PoolStats>,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        queue: Arc<TaskQueue>,
        executor: Arc<dyn Execute>,
        store: Arc<ResultStore>,
        stats: Arc<PoolStats>,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            executor,
            store,
            stats,
        }
    }

    /// Process tasks until the queue is closed
    pub fn run(&self) {
        tracing::debug!(worker = %self.name, "worker started");

        while let Some(task) = self.queue.dequeue() {
            self.process(task);
        }

        tracing::debug!(worker = %self.name, "worker stopped");
    }

    /// Execute, persist and deliver one task
    pub fn process(&self, task: Task) -> Delivery {
        let (record, reply) = task.into_parts();

        let result = self.execute(&record);
        let ok = result.is_ok();
        let outcome = self.store.persist(&record, result);
        self.stats.record_processed(ok);

        tracing::info!(
            worker = %self.name,
            task_id = %record.id,
            op = %record.op,
            status = outcome.result.status(),
            "task processed"
        );

        let delivery = reply.send(outcome.result);
        match delivery {
            Delivery::Delivered => self.stats.record_delivered(),
            Delivery::Abandoned => {
                self.stats.record_orphaned();
                tracing::warn!(
                    worker = %self.name,
                    task_id = %record.id,
                    "orphaned completion: connection stopped waiting, result persisted only"
                );
            }
        }
        delivery
    }

    fn execute(&self, record: &TaskRecord) -> TaskResult {
        let executor = &self.executor;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            executor.execute(record.op, &record.data)
        }));

        match outcome {
            Ok(Ok(output)) => TaskResult::ok(&self.name, output),
            Ok(Err(e)) => {
                tracing::warn!(worker = %self.name, task_id = %record.id, error = %e, "task failed");
                TaskResult::error(&self.name, e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(worker = %self.name, task_id = %record.id, "executor panicked: {}", message);
                TaskResult::error(&self.name, format!("executor panicked: {}", message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
