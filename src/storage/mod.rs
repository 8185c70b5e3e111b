//! Storage Module
//!
//! Durable record of every completed task.
//!
//! ## Layout
//! ```text
//! {data_dir}/
//!   ├── results.sqlite          results(id, task, result, ts)
//!   └── blobs/
//!         ├── {task_id}.json    {"task": ..., "result": ...}
//!         └── ...
//! ```
//!
//! Both stores are append-only from the workers' point of view: rows are
//! inserted, files are created, nothing is updated in place.

mod blob_store;
mod manager;
mod record_store;

pub use blob_store::{BlobDocument, BlobStore};
pub use manager::{PersistOutcome, ResultStore};
pub use record_store::{PersistedRecord, RecordStore};
