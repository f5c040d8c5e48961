//! Multi-producer stress tests for the ring buffer
//!
//! These tests verify:
//! - No loss and per-producer FIFO under the blocking policy
//! - No reordering under the discard policy, with drops expected
//! - Clean hand-off when producers outrun a slow consumer

use ringlog::{BlockOnFull, DiscardOnFull, RingBuffer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestRecord {
    data: String,
    thread_id: usize,
    sequence: usize,
}

fn spawn_producers<P>(
    queue: &Arc<RingBuffer<TestRecord, P>>,
    producers: usize,
    items: usize,
    payload: &'static str,
    start: &Arc<AtomicBool>,
    finished: &Arc<AtomicUsize>,
) -> Vec<thread::JoinHandle<()>>
where
    P: ringlog::AdmissionPolicy,
{
    (0..producers)
        .map(|t| {
            let queue = Arc::clone(queue);
            let start = Arc::clone(start);
            let finished = Arc::clone(finished);
            thread::spawn(move || {
                while !start.load(Ordering::Acquire) {
                    std::hint::spin_loop();
                }
                for i in 0..items {
                    queue.push(TestRecord {
                        data: payload.to_string(),
                        thread_id: t,
                        sequence: i,
                    });
                }
                finished.fetch_add(1, Ordering::Release);
            })
        })
        .collect()
}

#[test]
fn test_multi_producer_block_policy_integrity() {
    const QUEUE_SIZE: usize = 1024 * 16;
    const NUM_PRODUCERS: usize = 8;
    const ITEMS_PER_PRODUCER: usize = 10_000;

    let queue: Arc<RingBuffer<TestRecord, BlockOnFull>> =
        Arc::new(RingBuffer::new(QUEUE_SIZE).unwrap());
    let start = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicUsize::new(0));

    let handles = spawn_producers(
        &queue,
        NUM_PRODUCERS,
        ITEMS_PER_PRODUCER,
        "payload",
        &start,
        &finished,
    );
    start.store(true, Ordering::Release);

    let mut consumer = queue.consumer().unwrap();
    let mut next_expected = vec![0usize; NUM_PRODUCERS];
    let mut total = 0;

    while total < NUM_PRODUCERS * ITEMS_PER_PRODUCER {
        match consumer.pop() {
            Some(record) => {
                assert!(record.thread_id < NUM_PRODUCERS, "invalid thread id");
                assert_eq!(record.data, "payload");
                assert_eq!(
                    record.sequence, next_expected[record.thread_id],
                    "gap or disorder for producer {}",
                    record.thread_id
                );
                next_expected[record.thread_id] += 1;
                total += 1;
            }
            None => thread::yield_now(),
        }
    }
    drop(consumer);

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(total, NUM_PRODUCERS * ITEMS_PER_PRODUCER);
    assert!(next_expected.iter().all(|&n| n == ITEMS_PER_PRODUCER));
    assert!(queue.is_empty());
}

#[test]
fn test_discard_policy_stress_never_reorders() {
    const QUEUE_SIZE: usize = 256;
    const NUM_PRODUCERS: usize = 8;
    const ITEMS_PER_PRODUCER: usize = 100_000;

    let queue: Arc<RingBuffer<TestRecord, DiscardOnFull>> =
        Arc::new(RingBuffer::new(QUEUE_SIZE).unwrap());
    let start = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicUsize::new(0));

    let handles = spawn_producers(
        &queue,
        NUM_PRODUCERS,
        ITEMS_PER_PRODUCER,
        "drop_test",
        &start,
        &finished,
    );
    start.store(true, Ordering::Release);

    let mut consumer = queue.consumer().unwrap();
    let mut last_seen: Vec<Option<usize>> = vec![None; NUM_PRODUCERS];
    let mut total = 0usize;

    loop {
        match consumer.pop() {
            Some(record) => {
                total += 1;
                assert!(record.thread_id < NUM_PRODUCERS);
                if let Some(last) = last_seen[record.thread_id] {
                    assert!(
                        record.sequence > last,
                        "reordering: producer {} seq {} after {}",
                        record.thread_id,
                        record.sequence,
                        last
                    );
                }
                last_seen[record.thread_id] = Some(record.sequence);
            }
            None => {
                if finished.load(Ordering::Acquire) == NUM_PRODUCERS {
                    // Producers are done; anything left is already committed
                    while let Some(record) = consumer.pop() {
                        total += 1;
                        if let Some(last) = last_seen[record.thread_id] {
                            assert!(record.sequence > last);
                        }
                        last_seen[record.thread_id] = Some(record.sequence);
                    }
                    break;
                }
                thread::yield_now();
            }
        }
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(total < NUM_PRODUCERS * ITEMS_PER_PRODUCER, "expected drops");
    assert!(total > 0);
}

#[test]
fn test_slow_consumer_with_tiny_block_ring() {
    const NUM_PRODUCERS: usize = 4;
    const ITEMS_PER_PRODUCER: usize = 2_000;

    let queue: Arc<RingBuffer<TestRecord, BlockOnFull>> = Arc::new(RingBuffer::new(4).unwrap());
    let start = Arc::new(AtomicBool::new(true));
    let finished = Arc::new(AtomicUsize::new(0));

    let handles = spawn_producers(
        &queue,
        NUM_PRODUCERS,
        ITEMS_PER_PRODUCER,
        "tiny",
        &start,
        &finished,
    );

    let mut consumer = queue.consumer().unwrap();
    let mut counts = vec![0usize; NUM_PRODUCERS];
    let mut total = 0;
    while total < NUM_PRODUCERS * ITEMS_PER_PRODUCER {
        if let Some(record) = consumer.pop() {
            assert_eq!(record.sequence, counts[record.thread_id]);
            counts[record.thread_id] += 1;
            total += 1;
        } else {
            thread::yield_now();
        }
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(finished.load(Ordering::Acquire), NUM_PRODUCERS);
    assert_eq!(consumer.pop(), None);
}

#[test]
fn test_second_consumer_refused_across_threads() {
    let queue: Arc<RingBuffer<u64, BlockOnFull>> = Arc::new(RingBuffer::new(8).unwrap());
    let consumer = queue.consumer().unwrap();

    let other = Arc::clone(&queue);
    let refused = thread::spawn(move || other.consumer().is_none())
        .join()
        .unwrap();
    assert!(refused);

    drop(consumer);
    assert!(queue.consumer().is_some());
}
