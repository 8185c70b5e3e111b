//! Result Store
//!
//! Coordinates the two independent writes made for every completed task.
//!
//! ## Write Order
//! 1. Blob store: `{task, result}` document, atomic rename
//! 2. Attach the blob path to the result
//! 3. Record store: row with the result (including the artifact path)
//!
//! The writes are not transactional. Either may fail on its own; failures
//! are logged and the result still flows back to the worker. Between steps
//! 1 and 3 a reader can observe the blob without its row.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::task::{TaskId, TaskRecord, TaskResult};

use super::{BlobDocument, BlobStore, PersistedRecord, RecordStore};

/// What `persist` managed to write
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    /// The result, with its artifact path attached when the blob was written
    pub result: TaskResult,

    /// Row id in the record store, if the insert succeeded
    pub record_id: Option<i64>,

    /// Blob path, if the blob write succeeded
    pub artifact_path: Option<PathBuf>,
}

impl PersistOutcome {
    /// Both stores were written
    pub fn is_complete(&self) -> bool {
        self.record_id.is_some() && self.artifact_path.is_some()
    }
}

/// The dual persistence layer
pub struct ResultStore {
    records: RecordStore,
    blobs: BlobStore,
}

impl ResultStore {
    const DATABASE_FILENAME: &'static str = "results.sqlite";
    const BLOB_DIR: &'static str = "blobs";

    /// Open or create both stores under `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        let records = RecordStore::open(&data_dir.join(Self::DATABASE_FILENAME))?;
        let blobs = BlobStore::open(&data_dir.join(Self::BLOB_DIR))?;

        Ok(Self {
            records,
            blobs,
        })
    }

    /// Write a completed task to both stores. Never fails.
    pub fn persist(&self, task: &TaskRecord, result: TaskResult) -> PersistOutcome {
        let artifact_path = match self.blobs.write(task, &result) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(task_id = %task.id, error = %e, "blob write failed");
                None
            }
        };

        let result = match &artifact_path {
            Some(path) => result.with_artifact(path.to_string_lossy()),
            None => result,
        };

        let record_id = match self.records.append(task, &result) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(task_id = %task.id, error = %e, "record insert failed");
                None
            }
        };

        PersistOutcome {
            result,
            record_id,
            artifact_path,
        }
    }

    // =========================================================================
    // Read Side
    // =========================================================================

    pub fn find_record(&self, id: &TaskId) -> Result<Option<PersistedRecord>> {
        self.records.find_by_task(id)
    }

    pub fn read_blob(&self, id: &TaskId) -> Result<Option<BlobDocument>> {
        self.blobs.read(id)
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }
}
