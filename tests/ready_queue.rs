mod common;
use crate::common::with_timeout;

use std::sync::Arc;
use std::time::Duration;

use dagbuild::dag::ReadyItem;
use dagbuild::engine::{Completion, Dispatch, ReadyQueue, completion_channel};
use dagbuild::errors::BuildError;

#[tokio::test]
async fn take_returns_shortest_task_first() {
    let queue = ReadyQueue::new();
    queue.push(ReadyItem::new("long", 15));
    queue.push(ReadyItem::new("short", 2));
    queue.push(ReadyItem::new("mid", 8));
    assert_eq!(queue.len(), 3);

    let mut order = Vec::new();
    while !queue.is_empty() {
        match queue.take().await.unwrap() {
            Dispatch::Task(item) => order.push(item.to_string()),
            Dispatch::Stop => panic!("no stop signal was queued"),
        }
    }

    assert_eq!(order, vec!["short:2", "mid:8", "long:15"]);
}

#[tokio::test]
async fn equal_durations_break_ties_by_id() {
    let queue = ReadyQueue::new();
    queue.push(ReadyItem::new("b", 5));
    queue.push(ReadyItem::new("c", 5));
    queue.push(ReadyItem::new("a", 5));

    for expected in ["a", "b", "c"] {
        assert_eq!(
            queue.take().await.unwrap(),
            Dispatch::Task(ReadyItem::new(expected, 5))
        );
    }
}

#[tokio::test]
async fn stop_signals_never_overtake_tasks() {
    let queue = ReadyQueue::new();
    queue.push_stop(2);
    queue.push(ReadyItem::new("late", 0));

    assert_eq!(queue.take().await.unwrap(), Dispatch::Task(ReadyItem::new("late", 0)));
    assert_eq!(queue.take().await.unwrap(), Dispatch::Stop);
    assert_eq!(queue.take().await.unwrap(), Dispatch::Stop);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn take_waits_for_a_push() {
    let queue = Arc::new(ReadyQueue::new());

    let consumer = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.take().await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!consumer.is_finished());

    queue.push(ReadyItem::new("A", 1));
    let taken = with_timeout(consumer).await.unwrap().unwrap();
    assert_eq!(taken, Dispatch::Task(ReadyItem::new("A", 1)));
}

#[tokio::test]
async fn close_wakes_waiting_consumers_with_an_error() {
    let queue = Arc::new(ReadyQueue::new());

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.take().await })
        })
        .collect();

    tokio::task::yield_now().await;
    queue.close();
    assert!(queue.is_closed());

    for consumer in consumers {
        let taken = with_timeout(consumer).await.unwrap();
        assert!(matches!(taken, Err(BuildError::InterruptedExecution(_))));
    }
}

#[tokio::test]
async fn completion_queue_is_fifo() {
    let (tx, mut rx) = completion_channel();
    let tx2 = tx.clone();

    tx.send(Completion::success("first")).unwrap();
    tx2.send(Completion::failed("second", "boom")).unwrap();

    assert_eq!(rx.take().await.unwrap(), Completion::success("first"));
    assert_eq!(rx.take().await.unwrap(), Completion::failed("second", "boom"));
    assert!(rx.try_take().is_none());
}

#[tokio::test]
async fn completion_queue_reports_when_all_senders_are_gone() {
    let (tx, mut rx) = completion_channel();
    drop(tx);

    assert!(matches!(rx.take().await, Err(BuildError::InterruptedExecution(_))));
}
