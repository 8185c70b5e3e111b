//! Tests for the Task Queue
//!
//! These tests verify:
//! - FIFO order
//! - Blocking dequeue and wakeup
//! - Capacity rejection
//! - Close semantics

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use relayq::task::{Operation, ReplyError, Task, TaskQueue};
use relayq::RelayError;

fn task(data: &str) -> Task {
    let (task, _rx) = Task::new(Operation::Echo, data);
    task
}

#[test]
fn test_fifo_order() {
    let queue = TaskQueue::new(0);
    for i in 0..10 {
        queue.enqueue(task(&i.to_string())).unwrap();
    }
    assert_eq!(queue.len(), 10);

    for i in 0..10 {
        let t = queue.dequeue().unwrap();
        assert_eq!(t.record().data, i.to_string());
    }
    assert!(queue.is_empty());
}

#[test]
fn test_dequeue_blocks_until_enqueue() {
    let queue = Arc::new(TaskQueue::new(0));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.dequeue().map(|t| t.record().data.clone()))
    };

    thread::sleep(Duration::from_millis(50));
    queue.enqueue(task("wake")).unwrap();

    assert_eq!(consumer.join().unwrap().as_deref(), Some("wake"));
}

#[test]
fn test_bounded_queue_rejects_when_full() {
    let queue = TaskQueue::new(2);
    queue.enqueue(task("a")).unwrap();
    queue.enqueue(task("b")).unwrap();

    match queue.enqueue(task("c")) {
        Err(RelayError::Overloaded { capacity }) => assert_eq!(capacity, 2),
        other => panic!("Expected Overloaded, got {:?}", other),
    }

    // Room again after a dequeue
    queue.dequeue().unwrap();
    queue.enqueue(task("c")).unwrap();
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_unbounded_queue_grows() {
    let queue = TaskQueue::new(0);
    for i in 0..5_000 {
        queue.enqueue(task(&i.to_string())).unwrap();
    }
    assert_eq!(queue.len(), 5_000);
    assert_eq!(queue.capacity(), 0);
}

#[test]
fn test_close_wakes_blocked_consumers() {
    let queue = Arc::new(TaskQueue::new(0));

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue().is_none())
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    queue.close();

    for consumer in consumers {
        assert!(consumer.join().unwrap());
    }
}

#[test]
fn test_enqueue_after_close_fails() {
    let queue = TaskQueue::new(0);
    queue.close();
    assert!(queue.is_closed());
    assert!(matches!(queue.enqueue(task("late")), Err(RelayError::QueueClosed)));
    assert!(queue.dequeue().is_none());
}

#[test]
fn test_each_task_dequeued_once_across_consumers() {
    let queue = Arc::new(TaskQueue::new(0));

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(t) = queue.dequeue() {
                    seen.push(t.id());
                }
                seen
            })
        })
        .collect();

    for i in 0..200 {
        queue.enqueue(task(&i.to_string())).unwrap();
    }
    while !queue.is_empty() {
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(20));
    queue.close();

    let mut ids = Vec::new();
    for consumer in consumers {
        ids.extend(consumer.join().unwrap());
    }
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(total, 200);
    assert_eq!(ids.len(), 200);
}

#[test]
fn test_close_disconnects_pending_replies() {
    let queue = TaskQueue::new(0);
    let (pending, rx) = Task::new(Operation::Echo, "never run");
    queue.enqueue(pending).unwrap();
    queue.enqueue(task("other")).unwrap();

    assert_eq!(queue.close(), 2);
    assert!(queue.is_empty());
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)),
        Err(ReplyError::Disconnected)
    );
}
