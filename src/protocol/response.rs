//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::task::{TaskId, TaskResult};

/// A response frame
///
/// ```text
/// {"status":"ok","task_id":...,"worker":...,"result":...,"artifact_path":...}
/// {"status":"error","message":...,"worker"?:...,"task_id"?:...}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
        worker: String,
        result: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact_path: Option<String>,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        worker: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
    },
}

impl Response {
    /// Create an ERROR response not tied to any task
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
            worker: None,
            task_id: None,
        }
    }

    /// Create an ERROR response for a task that was enqueued
    pub fn task_error(task_id: TaskId, message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
            worker: None,
            task_id: Some(task_id.to_string()),
        }
    }

    /// Wrap a worker's result for the wire
    pub fn from_result(task_id: TaskId, result: TaskResult) -> Self {
        let task_id = Some(task_id.to_string());
        match result {
            TaskResult::Ok {
                worker,
                result,
                artifact_path,
            } => Response::Ok {
                task_id,
                worker,
                result,
                artifact_path,
            },
            TaskResult::Error { worker, message } => Response::Error {
                message,
                worker,
                task_id,
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            Response::Ok { task_id, .. } | Response::Error { task_id, .. } => task_id.as_deref(),
        }
    }

    /// The `result` field of an OK response
    pub fn result(&self) -> Option<&str> {
        match self {
            Response::Ok { result, .. } => Some(result),
            Response::Error { .. } => None,
        }
    }

    /// The `message` field of an ERROR response
    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Error { message, .. } => Some(message),
            Response::Ok { .. } => None,
        }
    }
}
