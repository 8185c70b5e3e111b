//! # relayq
//!
//! A line-delimited JSON task relay with:
//! - Many concurrent TCP connections feeding one shared task queue
//! - A fixed pool of worker threads draining it
//! - A one-shot reply channel per task, bounded by a timeout
//! - Dual persistence of every result (SQLite row + JSON blob)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (one thread per connection, capped)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request {op, data}
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │      build Task + reply channel, enqueue, wait (timeout)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!               ┌───────▼───────┐
//!               │   TaskQueue   │   (bounded, FIFO)
//!               └───────┬───────┘
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   ┌──────────┐  ┌──────────┐  ┌──────────┐
//!   │ worker-1 │  │ worker-2 │  │ worker-N │
//!   └────┬─────┘  └────┬─────┘  └────┬─────┘
//!        │  execute → persist → reply │
//!        ▼                            ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RecordStore │          │  BlobStore  │
//!   │  (SQLite)   │          │ (JSON files)│
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod engine;
pub mod executor;
pub mod network;
pub mod protocol;
pub mod storage;
pub mod task;
pub mod worker;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use engine::Engine;
pub use error::{RelayError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of relayq
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
