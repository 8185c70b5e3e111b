//! Task Queue
//!
//! Shared FIFO between connection handlers (producers) and workers
//! (consumers), backed by a crossbeam channel.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use crossbeam::select;
use parking_lot::Mutex;

use crate::error::{RelayError, Result};

use super::Task;

/// Multi-producer / multi-consumer task queue
///
/// ## Semantics
/// - `enqueue` never blocks: a full queue rejects with `Overloaded`
/// - `dequeue` blocks until a task arrives or the queue is closed
/// - Tasks are served in arrival order across all producers
pub struct TaskQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,

    /// Dropping this sender wakes every blocked `dequeue`
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,

    /// 0 when unbounded
    capacity: usize,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` pending tasks (0 = unbounded)
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = if capacity == 0 {
            channel::unbounded()
        } else {
            channel::bounded(capacity)
        };
        let (shutdown_tx, shutdown_rx) = channel::bounded(0);

        Self {
            tx,
            rx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
            capacity,
        }
    }

    /// Append a task to the tail
    pub fn enqueue(&self, task: Task) -> Result<()> {
        if self.is_closed() {
            return Err(RelayError::QueueClosed);
        }
        match self.tx.try_send(task) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(RelayError::Overloaded {
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(RelayError::QueueClosed),
        }
    }

    /// Block until a task is available; `None` once the queue is closed
    pub fn dequeue(&self) -> Option<Task> {
        if self.is_closed() {
            return None;
        }
        select! {
            recv(self.rx) -> task => task.ok(),
            recv(self.shutdown_rx) -> _ => None,
        }
    }

    /// Stop accepting tasks and release all blocked consumers.
    ///
    /// Tasks still waiting are dropped, which disconnects their reply
    /// channels. Returns how many were dropped.
    pub fn close(&self) -> usize {
        self.shutdown_tx.lock().take();
        self.rx.try_iter().count()
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown_tx.lock().is_none()
    }

    /// Number of tasks waiting
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Configured bound (0 = unbounded)
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
