//! Blob Store
//!
//! One JSON document per task, addressed by task id.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::task::{TaskId, TaskRecord, TaskResult};

/// Contents of a blob file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobDocument {
    pub task: TaskRecord,
    pub result: TaskResult,
}

/// Directory of `{task_id}.json` files
///
/// ## Atomicity:
/// Each document is written to `{task_id}.json.tmp`, fsynced, then renamed
/// over the final name. Readers see either no file or a complete one.
/// Temp names are per task, so concurrent workers never share one.
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    const EXTENSION: &'static str = "json";
    const TMP_SUFFIX: &'static str = ".tmp";

    /// Open or create the blob directory
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Write the document for a task, returning its final path
    pub fn write(&self, task: &TaskRecord, result: &TaskResult) -> Result<PathBuf> {
        let path = self.path_for(&task.id);
        let tmp_path = self.tmp_path_for(&task.id);

        let document = BlobDocument {
            task: task.clone(),
            result: result.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        if let Err(e) = Self::write_synced(&tmp_path, &bytes)
            .and_then(|()| fs::rename(&tmp_path, &path))
        {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(path)
    }

    /// Read a task's document, if it has been written
    pub fn read(&self, id: &TaskId) -> Result<Option<BlobDocument>> {
        let bytes = match fs::read(self.path_for(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Ids of every completed document (temp files are skipped)
    pub fn ids(&self) -> Result<Vec<TaskId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(id) = Self::parse_task_id(&path) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Final path of a task's document
    pub fn path_for(&self, id: &TaskId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, Self::EXTENSION))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn tmp_path_for(&self, id: &TaskId) -> PathBuf {
        self.dir
            .join(format!("{}.{}{}", id, Self::EXTENSION, Self::TMP_SUFFIX))
    }

    /// "3f2a….json" → Some(id); "3f2a….json.tmp" → None
    fn parse_task_id(path: &Path) -> Option<TaskId> {
        if path.extension()? != Self::EXTENSION {
            return None;
        }
        path.file_stem()?.to_str()?.parse().ok()
    }
}
