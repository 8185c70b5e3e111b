//! Task Module
//!
//! Units of work and the plumbing that moves them.
//!
//! ## Lifecycle
//! ```text
//! created ──▶ queued ──▶ in-progress ──┬──▶ delivered
//!                                      └──▶ undeliverable (reader timed out)
//! ```
//! A task is persisted in both terminal states.

mod operation;
mod queue;
mod reply;
mod result;

pub use operation::Operation;
pub use queue::TaskQueue;
pub use reply::{reply_channel, Delivery, ReplyError, ReplyReceiver, ReplySender};
pub use result::TaskResult;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique task identifier (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The serializable part of a task (everything except the reply channel)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub op: Operation,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

/// A unit of work travelling from a connection to a worker
#[derive(Debug)]
pub struct Task {
    record: TaskRecord,
    reply: ReplySender,
}

impl Task {
    /// Build a task with a fresh id and reply channel.
    ///
    /// Returns the receiving half for the caller to wait on.
    pub fn new(op: Operation, data: impl Into<String>) -> (Self, ReplyReceiver) {
        let (reply, receiver) = reply_channel();
        let record = TaskRecord {
            id: TaskId::new(),
            op,
            data: data.into(),
            created_at: Utc::now(),
        };
        (Self { record, reply }, receiver)
    }

    pub fn id(&self) -> TaskId {
        self.record.id
    }

    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    /// Split into the persisted part and the reply handle
    pub fn into_parts(self) -> (TaskRecord, ReplySender) {
        (self.record, self.reply)
    }
}
