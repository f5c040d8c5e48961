//! Bounded lock-free MPSC ring buffer
//!
//! Fixed array of slots, each carrying a sequence number that encodes its
//! state for the absolute index `i` that maps onto it:
//!
//! - `seq == i`: writable by the producer that reserved `i`
//! - `seq == i + 1`: readable by the consumer
//! - `seq == i + capacity`: consumed, writable for the next lap
//!
//! Producers race on `head` (CAS for `try_reserve`, `fetch_add` for
//! `reserve`). The single consumer owns `tail`. The release store of a
//! slot's sequence paired with the acquire load on the other side is the
//! only cross-thread synchronization; no lock is taken on this path.

use super::admission::{AdmissionPolicy, BlockOnFull};
use super::error::{LoggerError, Result};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new(sequence: usize) -> Self {
        Self {
            sequence: AtomicUsize::new(sequence),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// A claimed, not yet published slot
///
/// Must be passed to [`RingBuffer::commit`] on the ring that issued it. An
/// abandoned reservation stalls the consumer at that index.
#[must_use = "a reservation must be committed or the consumer stalls"]
#[derive(Debug, PartialEq, Eq)]
pub struct Reservation {
    index: usize,
    ring: usize,
}

impl Reservation {
    /// Absolute (unmasked) index of the claimed slot
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Smallest accepted capacity
///
/// With one slot the "consumed" sequence of lap `n` equals the "writable"
/// sequence of lap `n + 1`, so a blocked producer could overwrite an unread
/// record.
pub const MIN_CAPACITY: usize = 2;

pub struct RingBuffer<T, P = BlockOnFull> {
    slots: Box<[Slot<T>]>,
    mask: usize,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    consumer_claimed: AtomicBool,
    _policy: PhantomData<fn() -> P>,
}

// SAFETY: payloads only move between threads through the reserve/commit/pop
// protocol, which hands each slot to exactly one thread at a time.
unsafe impl<T: Send, P> Send for RingBuffer<T, P> {}
unsafe impl<T: Send, P> Sync for RingBuffer<T, P> {}

impl<T, P: AdmissionPolicy> RingBuffer<T, P> {
    /// Create a ring with `capacity` slots
    ///
    /// Returns `InvalidConfiguration` unless `capacity` is a power of two
    /// of at least [`MIN_CAPACITY`].
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_CAPACITY || !capacity.is_power_of_two() {
            return Err(LoggerError::config(
                "RingBuffer",
                format!(
                    "capacity must be a power of two of at least {}, got {}",
                    MIN_CAPACITY, capacity
                ),
            ));
        }

        let slots = (0..capacity).map(Slot::new).collect::<Vec<_>>();

        Ok(Self {
            slots: slots.into_boxed_slice(),
            mask: capacity - 1,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            consumer_claimed: AtomicBool::new(false),
            _policy: PhantomData,
        })
    }

    /// Enqueue through the bound admission policy
    #[inline]
    pub fn push(&self, item: T) -> bool {
        P::push(self, item)
    }
}

impl<T, P> RingBuffer<T, P> {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate number of claimed slots not yet consumed
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        head.wrapping_sub(tail).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn id(&self) -> usize {
        self.slots.as_ptr() as usize
    }

    /// Claim the next slot if the ring has room; never blocks
    pub fn try_reserve(&self) -> Option<Reservation> {
        let mut head = self.head.load(Ordering::Relaxed);

        loop {
            let tail = self.tail.load(Ordering::Acquire);
            if head.wrapping_sub(tail) >= self.capacity() {
                return None;
            }

            match self.head.compare_exchange_weak(
                head,
                head.wrapping_add(1),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Some(Reservation {
                        index: head,
                        ring: self.id(),
                    })
                }
                Err(current) => head = current,
            }
        }
    }

    /// Claim the next slot unconditionally
    ///
    /// May run ahead of the consumer; the matching [`commit`](Self::commit)
    /// then waits for the slot itself to free up.
    pub fn reserve(&self) -> Reservation {
        Reservation {
            index: self.head.fetch_add(1, Ordering::Relaxed),
            ring: self.id(),
        }
    }

    /// Write `item` into the reserved slot and publish it to the consumer
    ///
    /// Yield-spins while the slot still holds the previous lap's record.
    ///
    /// # Panics
    ///
    /// If `reservation` was issued by a different ring buffer.
    pub fn commit(&self, reservation: Reservation, item: T) {
        assert_eq!(
            reservation.ring,
            self.id(),
            "reservation committed to a ring buffer that did not issue it"
        );

        let index = reservation.index;
        let slot = &self.slots[index & self.mask];

        while slot.sequence.load(Ordering::Acquire) != index {
            thread::yield_now();
        }

        // SAFETY: seq == index means the consumer is done with this slot and
        // no other producer holds `index`, so we have exclusive access.
        unsafe {
            (*slot.value.get()).write(item);
        }
        slot.sequence.store(index.wrapping_add(1), Ordering::Release);
    }

    /// Claim the consumer side of the ring
    ///
    /// Returns `None` while another [`Consumer`] is alive.
    pub fn consumer(&self) -> Option<Consumer<'_, T, P>> {
        self.consumer_claimed
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Consumer { ring: self })
    }

    /// # Safety
    ///
    /// Caller must be the only thread popping from this ring.
    unsafe fn pop_single_consumer(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let slot = &self.slots[tail & self.mask];

        if slot.sequence.load(Ordering::Acquire) != tail.wrapping_add(1) {
            return None;
        }

        let item = (*slot.value.get()).assume_init_read();
        slot.sequence
            .store(tail.wrapping_add(self.capacity()), Ordering::Release);
        // tail only has one writer; the slot handshake carries visibility
        self.tail.store(tail.wrapping_add(1), Ordering::Relaxed);
        Some(item)
    }
}

impl<T, P> Drop for RingBuffer<T, P> {
    fn drop(&mut self) {
        if !std::mem::needs_drop::<T>() {
            return;
        }

        let head = *self.head.get_mut();
        let mut index = *self.tail.get_mut();
        let mask = self.mask;

        while index != head {
            let slot = &mut self.slots[index & mask];
            if *slot.sequence.get_mut() == index.wrapping_add(1) {
                // SAFETY: published and never popped
                unsafe { slot.value.get_mut().assume_init_drop() };
            }
            index = index.wrapping_add(1);
        }
    }
}

impl<T, P: AdmissionPolicy> fmt::Debug for RingBuffer<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("policy", &P::NAME)
            .field("capacity", &self.capacity())
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}

/// Exclusive consumer handle for a [`RingBuffer`]
pub struct Consumer<'a, T, P> {
    ring: &'a RingBuffer<T, P>,
}

impl<T, P> Consumer<'_, T, P> {
    /// Take the next record; `None` if the tail slot is not yet published
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: at most one Consumer exists per ring
        unsafe { self.ring.pop_single_consumer() }
    }
}

impl<T, P> Drop for Consumer<'_, T, P> {
    fn drop(&mut self) {
        self.ring.consumer_claimed.store(false, Ordering::Release);
    }
}
