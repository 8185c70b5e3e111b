//! Engine Module
//!
//! Wires the queue, the worker pool and the result store together and
//! offers the single entry point connections use: [`Engine::submit`].
//!
//! ## Responsibilities
//! - Open the result store (creates tables and directories)
//! - Start the worker pool
//! - Turn a request into a task, enqueue it, and wait for its reply
//! - Shut the pool down

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::executor::{Execute, OperationExecutor};
use crate::protocol::{Request, Response};
use crate::storage::ResultStore;
use crate::task::{ReplyError, Task, TaskQueue};
use crate::worker::{StatsSnapshot, WorkerPool};

/// The request/reply coordinator
///
/// ## Concurrency Model
/// - Any number of connection threads call `submit` concurrently
/// - The queue is the only structure they share with the workers
/// - Each `submit` owns its task's reply receiver; nothing else can read it
///
/// A task that outlives its `submit` (reply timeout) is not cancelled: a
/// worker still runs and persists it, and the result is counted as orphaned.
pub struct Engine {
    config: Config,
    queue: Arc<TaskQueue>,
    store: Arc<ResultStore>,
    pool: Mutex<Option<WorkerPool>>,
    last_stats: Mutex<StatsSnapshot>,
}

impl Engine {
    /// Open the stores and start workers using the built-in executor
    pub fn open(config: Config) -> Result<Self> {
        let executor = OperationExecutor::from_config(&config);
        Self::with_executor(config, Arc::new(executor))
    }

    /// Open the stores and start workers driven by `executor`
    pub fn with_executor(config: Config, executor: Arc<dyn Execute>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(ResultStore::open(&config.data_dir)?);
        let queue = Arc::new(TaskQueue::new(config.queue_capacity));
        let pool = WorkerPool::spawn(
            config.worker_count,
            Arc::clone(&queue),
            executor,
            Arc::clone(&store),
        )?;

        tracing::debug!(
            data_dir = %config.data_dir.display(),
            queue_capacity = config.queue_capacity,
            "engine opened"
        );

        Ok(Self {
            config,
            queue,
            store,
            pool: Mutex::new(Some(pool)),
            last_stats: Mutex::new(StatsSnapshot::default()),
        })
    }

    /// Run one request to completion (or timeout) and build its response
    pub fn submit(&self, request: Request) -> Response {
        let op = match request.operation() {
            Ok(op) => op,
            Err(e) => return Response::error(e.to_string()),
        };

        let (task, reply) = Task::new(op, request.data);
        let task_id = task.id();

        if let Err(e) = self.queue.enqueue(task) {
            tracing::warn!(task_id = %task_id, error = %e, "task rejected");
            return Response::task_error(task_id, e.to_string());
        }

        tracing::trace!(task_id = %task_id, op = %op, "task enqueued");

        match reply.recv_timeout(self.reply_timeout()) {
            Ok(result) => Response::from_result(task_id, result),
            Err(e @ ReplyError::TimedOut(_)) => {
                tracing::warn!(task_id = %task_id, "reply timed out; task keeps running");
                Response::task_error(task_id, e.to_string())
            }
            Err(e @ ReplyError::Disconnected) => Response::task_error(task_id, e.to_string()),
        }
    }

    /// Parse and submit a raw frame
    pub fn submit_line(&self, line: &str) -> Response {
        match crate::protocol::decode_request(line) {
            Ok(request) => self.submit(request),
            Err(e) => Response::error(e.to_string()),
        }
    }

    /// Stop the workers. In-flight tasks finish; pending tasks are dropped and
    /// their waiting callers see a disconnected reply.
    pub fn shutdown(&self) -> Result<()> {
        let pool = self.pool.lock().take().ok_or(RelayError::QueueClosed)?;
        *self.last_stats.lock() = pool.stats();
        pool.shutdown();
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Tasks waiting for a worker
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Worker counters (frozen at shutdown)
    pub fn stats(&self) -> StatsSnapshot {
        match self.pool.lock().as_ref() {
            Some(pool) => pool.stats(),
            None => *self.last_stats.lock(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.pool.lock().as_ref().map_or(0, WorkerPool::size)
    }

    fn reply_timeout(&self) -> Duration {
        self.config.reply_timeout()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.get_mut().take() {
            pool.shutdown();
        }
    }
}
