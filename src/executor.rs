//! Operation Executor
//!
//! Maps (operation, payload) to an output string. Pure apart from the
//! optional simulated latency, which never affects the output.

use std::thread;
use std::time::Duration;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::Result;
use crate::task::Operation;

/// Something that can run a task's operation
///
/// Workers hold an `Arc<dyn Execute>`, so alternative executors (stalling,
/// failing) can be plugged into the pool.
pub trait Execute: Send + Sync {
    fn execute(&self, op: Operation, data: &str) -> Result<String>;
}

/// Apply an operation to a payload
pub fn apply(op: Operation, data: &str) -> String {
    match op {
        Operation::Uppercase => data.to_uppercase(),
        Operation::Hash => hex::encode(Sha256::digest(data.as_bytes())),
        Operation::Echo => format!("echo:{}", data),
    }
}

/// The built-in executor
#[derive(Debug, Clone, Default)]
pub struct OperationExecutor {
    /// Inclusive latency range in milliseconds; `None` runs immediately
    latency_ms: Option<(u64, u64)>,
}

impl OperationExecutor {
    /// Executor with no artificial delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that sleeps a random duration in `[min_ms, max_ms]` per task
    pub fn with_latency(min_ms: u64, max_ms: u64) -> Self {
        let latency_ms = (max_ms > 0).then_some((min_ms.min(max_ms), max_ms));
        Self { latency_ms }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_latency(config.min_latency_ms, config.max_latency_ms)
    }

    fn simulate_latency(&self) {
        if let Some((min, max)) = self.latency_ms {
            let ms = rand::rng().random_range(min..=max);
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl Execute for OperationExecutor {
    fn execute(&self, op: Operation, data: &str) -> Result<String> {
        self.simulate_latency();
        Ok(apply(op, data))
    }
}
