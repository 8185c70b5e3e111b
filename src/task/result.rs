//! Task results
//!
//! What a worker produces for a task. Serialized as-is into both stores.

use serde::{Deserialize, Serialize};

/// Outcome of processing one task
///
/// Serialized with an inline `status` tag so the JSON matches the wire
/// response shape: `{"status": "ok", "worker": ..., "result": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskResult {
    Ok {
        worker: String,
        result: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact_path: Option<String>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        worker: Option<String>,
        message: String,
    },
}

impl TaskResult {
    pub fn ok(worker: impl Into<String>, result: impl Into<String>) -> Self {
        TaskResult::Ok {
            worker: worker.into(),
            result: result.into(),
            artifact_path: None,
        }
    }

    pub fn error(worker: impl Into<String>, message: impl Into<String>) -> Self {
        TaskResult::Error {
            worker: Some(worker.into()),
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TaskResult::Ok { .. })
    }

    /// `"ok"` or `"error"`, as stored in the `status` field
    pub fn status(&self) -> &'static str {
        match self {
            TaskResult::Ok { .. } => "ok",
            TaskResult::Error { .. } => "error",
        }
    }

    pub fn worker(&self) -> Option<&str> {
        match self {
            TaskResult::Ok { worker, .. } => Some(worker),
            TaskResult::Error { worker, .. } => worker.as_deref(),
        }
    }

    pub fn artifact_path(&self) -> Option<&str> {
        match self {
            TaskResult::Ok { artifact_path, .. } => artifact_path.as_deref(),
            TaskResult::Error { .. } => None,
        }
    }

    /// Attach the blob location. Error results carry no artifact.
    pub fn with_artifact(self, path: impl Into<String>) -> Self {
        match self {
            TaskResult::Ok { worker, result, .. } => TaskResult::Ok {
                worker,
                result,
                artifact_path: Some(path.into()),
            },
            other => other,
        }
    }
}
