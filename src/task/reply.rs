//! Reply Channel
//!
//! Single-use, single-slot handoff between the worker that finishes a task
//! and the connection that is waiting for it.
//!
//! ## Slot States
//! ```text
//!            send()                recv_timeout()
//!   Empty ───────────▶ Filled ───────────────────▶ Taken
//!     │
//!     ├── receiver timed out / dropped ──▶ Abandoned
//!     └── sender dropped unsent ─────────▶ Closed
//! ```
//!
//! Sending never blocks. A send into an `Abandoned` slot is reported back to
//! the worker as [`Delivery::Abandoned`] so orphaned completions are visible.

use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use super::TaskResult;

/// Why a wait on the reply channel ended without a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("timed out after {0:?} waiting for a worker")]
    TimedOut(Duration),

    #[error("worker dropped the task without replying")]
    Disconnected,
}

/// What happened to a result handed to [`ReplySender::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A receiver was (or will be) there to take it
    Delivered,

    /// The receiver gave up before the result arrived
    Abandoned,
}

#[derive(Debug)]
enum Slot {
    Empty,
    Filled(TaskResult),
    Taken,
    Abandoned,
    Closed,
}

#[derive(Debug)]
struct Shared {
    slot: Mutex<Slot>,
    ready: Condvar,
}

/// Worker side of the channel
#[derive(Debug)]
pub struct ReplySender {
    shared: Arc<Shared>,
}

/// Connection side of the channel
#[derive(Debug)]
pub struct ReplyReceiver {
    shared: Arc<Shared>,
}

/// Create a fresh, empty reply channel
pub fn reply_channel() -> (ReplySender, ReplyReceiver) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Empty),
        ready: Condvar::new(),
    });
    (
        ReplySender {
            shared: Arc::clone(&shared),
        },
        ReplyReceiver { shared },
    )
}

impl ReplySender {
    /// Offer the result. Never blocks.
    pub fn send(self, result: TaskResult) -> Delivery {
        let mut slot = self.shared.slot.lock();
        match *slot {
            Slot::Empty => {
                *slot = Slot::Filled(result);
                self.shared.ready.notify_one();
                Delivery::Delivered
            }
            // `send` consumes the sender, so the slot can only be Empty or Abandoned here
            _ => Delivery::Abandoned,
        }
    }

    /// True once the receiver has given up on this task
    pub fn is_abandoned(&self) -> bool {
        matches!(*self.shared.slot.lock(), Slot::Abandoned)
    }
}

impl Drop for ReplySender {
    fn drop(&mut self) {
        let mut slot = self.shared.slot.lock();
        if matches!(*slot, Slot::Empty) {
            *slot = Slot::Closed;
            self.shared.ready.notify_one();
        }
    }
}

impl ReplyReceiver {
    /// Wait for the result, giving up after `timeout`.
    ///
    /// On timeout the slot is marked abandoned; a later send is dropped.
    /// A timeout too large to express as a deadline waits without limit.
    pub fn recv_timeout(self, timeout: Duration) -> Result<TaskResult, ReplyError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut slot = self.shared.slot.lock();

        loop {
            if let Some(outcome) = take(&mut slot) {
                return outcome;
            }
            let Some(deadline) = deadline else {
                self.shared.ready.wait(&mut slot);
                continue;
            };
            if self.shared.ready.wait_until(&mut slot, deadline).timed_out() {
                // A send may have raced the deadline
                if let Some(outcome) = take(&mut slot) {
                    return outcome;
                }
                *slot = Slot::Abandoned;
                return Err(ReplyError::TimedOut(timeout));
            }
        }
    }

    /// Take the result if it is already there
    pub fn try_recv(&self) -> Option<Result<TaskResult, ReplyError>> {
        take(&mut self.shared.slot.lock())
    }
}

impl Drop for ReplyReceiver {
    fn drop(&mut self) {
        let mut slot = self.shared.slot.lock();
        if matches!(*slot, Slot::Empty) {
            *slot = Slot::Abandoned;
        }
    }
}

/// Move a finished outcome out of the slot, leaving pending states untouched
fn take(slot: &mut Slot) -> Option<Result<TaskResult, ReplyError>> {
    match mem::replace(slot, Slot::Taken) {
        Slot::Filled(result) => Some(Ok(result)),
        Slot::Closed => {
            *slot = Slot::Closed;
            Some(Err(ReplyError::Disconnected))
        }
        Slot::Taken => None,
        pending @ (Slot::Empty | Slot::Abandoned) => {
            *slot = pending;
            None
        }
    }
}
