//! Admission policies for the async ring buffer
//!
//! A policy decides what `push` does when the ring is full. It is a type
//! parameter of [`RingBuffer`] and [`Worker`](super::worker::Worker), so the
//! choice is fixed when the queue is built and costs no branch per call.

use super::ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy applied by [`RingBuffer::push`]
pub trait AdmissionPolicy: Sized + Send + Sync + 'static {
    /// Name reported in diagnostics and configuration
    const NAME: &'static str;

    /// Enqueue `item`, returning whether it was accepted
    fn push<T>(queue: &RingBuffer<T, Self>, item: T) -> bool;
}

/// Drop the record when no slot is free
///
/// Producers never wait. Under sustained overload records are lost and
/// `push` returns `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscardOnFull;

impl AdmissionPolicy for DiscardOnFull {
    const NAME: &'static str = "DiscardOnFull";

    #[inline]
    fn push<T>(queue: &RingBuffer<T, Self>, item: T) -> bool {
        match queue.try_reserve() {
            Some(reservation) => {
                queue.commit(reservation, item);
                true
            }
            None => false,
        }
    }
}

/// Always accept; wait inside `commit` until the claimed slot frees
///
/// Warning: a stalled consumer makes producers wait indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockOnFull;

impl AdmissionPolicy for BlockOnFull {
    const NAME: &'static str = "BlockOnFull";

    #[inline]
    fn push<T>(queue: &RingBuffer<T, Self>, item: T) -> bool {
        let reservation = queue.reserve();
        queue.commit(reservation, item);
        true
    }
}

/// Configuration-level selector for the admission policy
///
/// Used once, at construction, to pick which monomorphized worker to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Wait for a free slot (no record loss)
    #[default]
    Block,
    /// Drop records when the queue is full
    Discard,
}

impl fmt::Display for OverflowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowStrategy::Block => write!(f, "{}", BlockOnFull::NAME),
            OverflowStrategy::Discard => write!(f, "{}", DiscardOnFull::NAME),
        }
    }
}
