//! Configuration for relayq
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RelayError, Result};

/// Main configuration for a relayq instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for persisted results
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── results.sqlite   (structured store)
    ///     └── blobs/           (one JSON document per task)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Worker Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads in the pool
    pub worker_count: usize,

    /// Max tasks waiting in the queue (0 = unbounded)
    pub queue_capacity: usize,

    /// How long a connection waits for its task's result (milliseconds)
    pub reply_timeout_ms: u64,

    /// Lower bound of the simulated execution latency (milliseconds)
    pub min_latency_ms: u64,

    /// Upper bound of the simulated execution latency (milliseconds)
    pub max_latency_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./relayq_data"),
            worker_count: 4,
            queue_capacity: 10_000,
            reply_timeout_ms: 10_000,
            min_latency_ms: 0,
            max_latency_ms: 0,
            listen_addr: "127.0.0.1:5001".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reply wait as a Duration
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Check the settings that would otherwise fail at runtime
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(RelayError::Config(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.min_latency_ms > self.max_latency_ms {
            return Err(RelayError::Config(format!(
                "latency range is inverted: min {}ms > max {}ms",
                self.min_latency_ms, self.max_latency_ms
            )));
        }
        if self.max_connections == 0 {
            return Err(RelayError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for both stores)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the number of workers
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Set the queue capacity (0 = unbounded)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the reply timeout (in milliseconds)
    pub fn reply_timeout_ms(mut self, ms: u64) -> Self {
        self.config.reply_timeout_ms = ms;
        self
    }

    /// Set the simulated latency range (in milliseconds)
    pub fn latency_ms(mut self, min: u64, max: u64) -> Self {
        self.config.min_latency_ms = min;
        self.config.max_latency_ms = max;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
