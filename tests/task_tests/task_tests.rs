//! Tests for Task types
//!
//! These tests verify:
//! - Task ids are unique and parse back from their string form
//! - Operation names follow the allow-list exactly
//! - Record and result JSON shapes

use std::collections::HashSet;

use relayq::task::{Operation, Task, TaskId, TaskResult};

// =============================================================================
// Task Id Tests
// =============================================================================

#[test]
fn test_task_ids_are_unique() {
    let ids: HashSet<TaskId> = (0..1000).map(|_| TaskId::new()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_task_id_parses_from_display() {
    let id = TaskId::new();
    let parsed: TaskId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
    assert!("not-a-uuid".parse::<TaskId>().is_err());
}

#[test]
fn test_record_json_has_no_reply_channel() {
    let (task, _rx) = Task::new(Operation::Hash, "abc");
    let value = serde_json::to_value(task.record()).unwrap();

    assert_eq!(value.as_object().unwrap().len(), 4);
    assert_eq!(value["op"], "hash");
    assert_eq!(value["data"], "abc");
    assert_eq!(value["id"], task.id().to_string());
    assert!(value["created_at"].is_string());
}

// =============================================================================
// Operation Tests
// =============================================================================

#[test]
fn test_parse_allow_list() {
    assert_eq!("uppercase".parse::<Operation>().unwrap(), Operation::Uppercase);
    assert_eq!("hash".parse::<Operation>().unwrap(), Operation::Hash);
    assert_eq!("echo".parse::<Operation>().unwrap(), Operation::Echo);
}

#[test]
fn test_parse_is_case_sensitive() {
    assert!("HASH".parse::<Operation>().is_err());
    assert!("bogus".parse::<Operation>().is_err());
    assert!("".parse::<Operation>().is_err());
}

#[test]
fn test_operation_uses_wire_names() {
    for op in Operation::ALL {
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, format!("\"{}\"", op.as_str()));
    }
}

// =============================================================================
// Result Tests
// =============================================================================

#[test]
fn test_ok_result_json_shape() {
    let result = TaskResult::ok("worker-1", "ABC").with_artifact("/tmp/x.json");
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["status"], "ok");
    assert_eq!(value["worker"], "worker-1");
    assert_eq!(value["result"], "ABC");
    assert_eq!(value["artifact_path"], "/tmp/x.json");
}

#[test]
fn test_error_result_ignores_artifact() {
    let result = TaskResult::error("worker-2", "boom").with_artifact("/tmp/x.json");
    assert_eq!(result.artifact_path(), None);
    assert_eq!(result.status(), "error");
    assert_eq!(result.worker(), Some("worker-2"));
}
