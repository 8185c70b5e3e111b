//! Tests for Engine
//!
//! These tests verify:
//! - Request validation (allow-list, malformed frames)
//! - Submit → worker → reply round trip
//! - Reply timeout without task cancellation
//! - Overload rejection on a bounded queue
//! - Engine lifecycle (open/shutdown)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use relayq::config::Config;
use relayq::engine::Engine;
use relayq::executor::{apply, Execute};
use relayq::protocol::{Request, Response};
use relayq::task::{Operation, TaskId};
use relayq::{RelayError, Result};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .worker_count(2)
        .reply_timeout_ms(5_000)
        .build()
}

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    (temp_dir, engine)
}

/// Executor that blocks every task until released
struct GateExecutor {
    open: Mutex<bool>,
    changed: Condvar,
    entered: AtomicUsize,
}

impl GateExecutor {
    fn closed() -> Arc<Self> {
        Arc::new(Self {
            open: Mutex::new(false),
            changed: Condvar::new(),
            entered: AtomicUsize::new(0),
        })
    }

    fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    fn release(&self) {
        *self.open.lock() = true;
        self.changed.notify_all();
    }
}

impl Execute for GateExecutor {
    fn execute(&self, op: Operation, data: &str) -> Result<String> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock();
        while !*open {
            self.changed.wait(&mut open);
        }
        Ok(apply(op, data))
    }
}

fn wait_for<F: Fn() -> bool>(condition: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met in time");
        thread::sleep(Duration::from_millis(10));
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_open_creates_stores() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("relay");

    let config = Config::builder().data_dir(&data_dir).build();
    let engine = Engine::open(config).unwrap();

    assert!(data_dir.join("results.sqlite").exists());
    assert!(data_dir.join("blobs").is_dir());
    assert_eq!(engine.worker_count(), 4);
}

#[test]
fn test_engine_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .worker_count(0)
        .build();

    assert!(matches!(Engine::open(config), Err(RelayError::Config(_))));
}

#[test]
fn test_shutdown_twice() {
    let (_temp, engine) = setup_temp_engine();
    engine.shutdown().unwrap();
    assert_eq!(engine.worker_count(), 0);
    assert!(engine.shutdown().is_err());
}

#[test]
fn test_submit_after_shutdown_is_an_error_response() {
    let (_temp, engine) = setup_temp_engine();
    engine.shutdown().unwrap();

    let response = engine.submit(Request::new("echo", "x"));
    assert!(!response.is_ok());
}

// =============================================================================
// Request Tests
// =============================================================================

#[test]
fn test_submit_hash() {
    let (_temp, engine) = setup_temp_engine();
    let response = engine.submit(Request::new("hash", "abc"));

    assert_eq!(
        response.result(),
        Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
    );
}

#[test]
fn test_submit_uppercase_and_echo() {
    let (_temp, engine) = setup_temp_engine();
    assert_eq!(engine.submit(Request::new("uppercase", "abc123")).result(), Some("ABC123"));
    assert_eq!(engine.submit(Request::new("echo", "x")).result(), Some("echo:x"));
}

#[test]
fn test_submit_unsupported_op() {
    let (_temp, engine) = setup_temp_engine();
    let response = engine.submit(Request::new("bogus", "x"));

    assert!(!response.is_ok());
    assert!(response.message().unwrap().contains("bogus"));
    // Rejected before enqueue: nothing persisted
    assert_eq!(engine.store().records().count().unwrap(), 0);
}

#[test]
fn test_submit_line_malformed() {
    let (_temp, engine) = setup_temp_engine();
    let response = engine.submit_line("{\"op\": \"hash\"");
    assert!(!response.is_ok());
    assert!(response.task_id().is_none());

    let response = engine.submit_line(r#"{"op":"hash","data":"abc"}"#);
    assert!(response.is_ok());
}

#[test]
fn test_submit_line_array_is_rejected() {
    let (_temp, engine) = setup_temp_engine();

    for line in [r#"["hash","abc"]"#, "[]", r#"["uppercase"]"#] {
        let response = engine.submit_line(line);
        assert!(!response.is_ok(), "{} should be rejected", line);
        assert!(response.message().unwrap().contains("invalid JSON"));
        assert!(response.task_id().is_none());
    }

    assert_eq!(engine.store().records().count().unwrap(), 0);
    assert!(engine.store().blobs().ids().unwrap().is_empty());
}

#[test]
fn test_missing_op_defaults_to_echo() {
    let (_temp, engine) = setup_temp_engine();
    let response = engine.submit_line(r#"{"data":"hi"}"#);
    assert_eq!(response.result(), Some("echo:hi"));
}

#[test]
fn test_ok_response_is_persisted_with_artifact() {
    let (_temp, engine) = setup_temp_engine();
    let response = engine.submit(Request::new("uppercase", "abc"));

    let (task_id, artifact_path) = match &response {
        Response::Ok { task_id, artifact_path, .. } => {
            (task_id.clone().unwrap(), artifact_path.clone().unwrap())
        }
        other => panic!("Expected OK response, got {:?}", other),
    };

    let id: TaskId = task_id.parse().unwrap();
    let row = engine.store().find_record(&id).unwrap().unwrap();
    assert_eq!(row.task.op, Operation::Uppercase);
    assert_eq!(row.result.artifact_path(), Some(artifact_path.as_str()));
    assert!(std::path::Path::new(&artifact_path).exists());
}

#[test]
fn test_identical_requests_identical_results() {
    let (_temp, engine) = setup_temp_engine();
    let first = engine.submit(Request::new("hash", "same"));
    let second = engine.submit(Request::new("hash", "same"));

    assert_eq!(first.result(), second.result());
    assert_ne!(first.task_id(), second.task_id());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_submits_get_their_own_results() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let data = format!("client-{}", i);
                let response = engine.submit(Request::new("uppercase", data.as_str()));
                assert_eq!(response.result(), Some(data.to_uppercase().as_str()));
                response.task_id().unwrap().to_string()
            })
        })
        .collect();

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}

#[test]
fn test_timeout_does_not_cancel_task() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .worker_count(1)
        .reply_timeout_ms(50)
        .build();
    let gate = GateExecutor::closed();
    let engine = Engine::with_executor(config, gate.clone()).unwrap();

    let response = engine.submit(Request::new("echo", "slow"));
    assert!(!response.is_ok());
    assert!(response.message().unwrap().contains("timed out"));
    let id: TaskId = response.task_id().unwrap().parse().unwrap();

    // Not persisted yet: the worker is still stalled
    assert!(engine.store().find_record(&id).unwrap().is_none());

    gate.release();
    wait_for(|| engine.store().find_record(&id).unwrap().is_some());
    wait_for(|| engine.stats().orphaned == 1);

    let row = engine.store().find_record(&id).unwrap().unwrap();
    assert_eq!(row.result.status(), "ok");
}

#[test]
fn test_bounded_queue_reports_overload() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .worker_count(1)
        .queue_capacity(1)
        .reply_timeout_ms(2_000)
        .build();
    let gate = GateExecutor::closed();
    let engine = Arc::new(Engine::with_executor(config, gate.clone()).unwrap());

    // First task occupies the worker, second fills the queue
    let submit = |data: &'static str| {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.submit(Request::new("echo", data)))
    };
    let first = submit("first");
    wait_for(|| gate.entered() == 1);
    let second = submit("second");
    wait_for(|| engine.queue_len() == 1);

    let response = engine.submit(Request::new("echo", "overflow"));
    assert!(!response.is_ok());
    assert!(response.message().unwrap().contains("overloaded"));

    gate.release();
    assert_eq!(first.join().unwrap().result(), Some("echo:first"));
    assert_eq!(second.join().unwrap().result(), Some("echo:second"));
}

#[test]
fn test_shutdown_disconnects_queued_tasks() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .worker_count(1)
        .reply_timeout_ms(30_000)
        .build();
    let gate = GateExecutor::closed();
    let engine = Arc::new(Engine::with_executor(config, gate.clone()).unwrap());

    let submit = |data: &'static str| {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.submit(Request::new("echo", data)))
    };
    let running = submit("running");
    wait_for(|| gate.entered() == 1);
    let queued = submit("queued");
    wait_for(|| engine.queue_len() == 1);

    // Blocks until the running task is released
    let stopper = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.shutdown())
    };

    let start = Instant::now();
    let response = queued.join().unwrap();
    assert!(!response.is_ok());
    assert!(response.message().unwrap().contains("without replying"));
    assert!(start.elapsed() < Duration::from_secs(10));

    gate.release();
    assert_eq!(running.join().unwrap().result(), Some("echo:running"));
    stopper.join().unwrap().unwrap();
}
