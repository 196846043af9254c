//! Bounded lock-free MPMC queue (C11), shared by `emberlang-rt`'s mailbox
//! and scheduler ready-queue.
//!
//! Implements the classic Vyukov bounded MPMC ring: each slot carries a
//! sequence number that producers and consumers use to claim it without
//! blocking each other, so pushes and pops from distinct slots proceed
//! fully in parallel.

// Layer 1: Standard library imports
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<Option<T>>,
}

/// A bounded multi-producer multi-consumer queue.
///
/// Capacity is rounded up to the next power of two internally so that slot
/// indices can be computed with a mask instead of a modulo.
pub struct MpmcQueue<T> {
    buffer: Box<[Slot<T>]>,
    mask: usize,
    enqueue_pos: AtomicUsize,
    dequeue_pos: AtomicUsize,
}

// SAFETY: access to each `Slot::value` is serialized by the sequence-number
// handshake below, so `T: Send` is sufficient for `Sync`.
unsafe impl<T: Send> Sync for MpmcQueue<T> {}

impl<T> MpmcQueue<T> {
    /// Create a queue that holds at least `capacity` items (rounded up to
    /// the next power of two, minimum 2).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two().max(2);
        let buffer: Vec<Slot<T>> = (0..capacity)
            .map(|i| Slot {
                sequence: AtomicUsize::new(i),
                value: UnsafeCell::new(None),
            })
            .collect();
        Self {
            buffer: buffer.into_boxed_slice(),
            mask: capacity - 1,
            enqueue_pos: AtomicUsize::new(0),
            dequeue_pos: AtomicUsize::new(0),
        }
    }

    /// The queue's fixed capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Non-blocking push. Returns `Err(value)` if the queue is full.
    pub fn push(&self, value: T) -> Result<(), T> {
        let mut pos = self.enqueue_pos.load(Ordering::Relaxed);
        loop {
            let slot = &self.buffer[pos & self.mask];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq as isize - pos as isize;
            if diff == 0 {
                match self.enqueue_pos.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: we own this slot exclusively until we bump
                        // its sequence below; no other producer can have
                        // claimed it (the CAS above serializes that).
                        unsafe { *slot.value.get() = Some(value) };
                        slot.sequence.store(pos + 1, Ordering::Release);
                        return Ok(());
                    }
                    Err(cur) => pos = cur,
                }
            } else if diff < 0 {
                return Err(value);
            } else {
                pos = self.enqueue_pos.load(Ordering::Relaxed);
            }
        }
    }

    /// Non-blocking pop. Returns `None` if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        let mut pos = self.dequeue_pos.load(Ordering::Relaxed);
        loop {
            let slot = &self.buffer[pos & self.mask];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq as isize - (pos as isize + 1);
            if diff == 0 {
                match self.dequeue_pos.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the sequence handshake above gives us
                        // exclusive access to this slot's value.
                        let value = unsafe { (*slot.value.get()).take() };
                        slot.sequence
                            .store(pos + self.mask + 1, Ordering::Release);
                        return value;
                    }
                    Err(cur) => pos = cur,
                }
            } else if diff < 0 {
                return None;
            } else {
                pos = self.dequeue_pos.load(Ordering::Relaxed);
            }
        }
    }

    /// Approximate length (subject to concurrent mutation).
    pub fn len(&self) -> usize {
        let enq = self.enqueue_pos.load(Ordering::Acquire);
        let deq = self.dequeue_pos.load(Ordering::Acquire);
        enq.saturating_sub(deq)
    }

    /// True when [`Self::len`] observed zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
