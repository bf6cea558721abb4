//! Lock-Free Sample Ring for the Sampler → Runner Hand-Off
#![allow(unsafe_code)] // Required for lock-free slot access
//!
//! ## Overview
//!
//! A bounded Single Producer Single Consumer (SPSC) ring carrying `Copy`
//! values, usually [`Sample`](crate::sample::Sample)s, from the sampling
//! thread to the batch runner. Neither side ever blocks or takes a lock.
//!
//! ```text
//! Sampler (producer)                      BatchRunner (consumer)
//!      ↓                                         ↓
//!   write slot ─→ publish head (Release)    load head (Acquire) ─→ read slot
//!                                                ↓
//!                                           CAS tail (AcqRel)
//! ```
//!
//! ## Algorithm
//!
//! `head` and `tail` are free-running counters; a slot index is the counter
//! masked by `N - 1`. One slot always stays empty, so usable capacity is
//! `N - 1` and `head - tail` is the occupancy.
//!
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  5  │  6  │  7  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!          ↑                       ↑
//!        tail                    head
//!        (next read)          (next write)
//! ```
//!
//! ### Overwrite-on-Full
//!
//! The sampler must never stall, so on a full ring it drops the oldest
//! sample: it advances `tail` itself with a compare-exchange, then writes.
//! This is the only place the producer touches `tail`. Because both sides may
//! move `tail`, the consumer reads a slot first and only keeps the copy if its
//! own compare-exchange on `tail` succeeds. A copy taken from a slot the
//! producer was rewriting at that moment is discarded and the read retried.
//!
//! ## Memory Ordering
//!
//! - Payload is written before `head` is published with Release
//! - `head` is loaded with Acquire before any payload read
//! - `tail` moves only through AcqRel compare-exchange
//! - Statistics counters are Relaxed; they never gate correctness
//!
//! ## Performance Characteristics
//!
//! | Operation        | Time Complexity | Allocation |
//! |------------------|-----------------|------------|
//! | push             | O(1)            | none       |
//! | push_overwrite   | O(1)            | none       |
//! | pop              | O(1) amortized  | none       |
//! | pop_batch(k)     | O(k)            | none       |

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::constants::sampling::MIN_RING_CAPACITY;

/// Ring statistics
///
/// Relaxed counters, safe to read from any thread at any time. They wrap on
/// overflow.
#[derive(Debug, Default)]
pub struct RingStats {
    /// Items accepted by either push flavour
    pub pushed: AtomicU32,
    /// Items handed to the consumer
    pub popped: AtomicU32,
    /// Items dropped by `push_overwrite` to make room
    pub overwritten: AtomicU32,
    /// Items refused by `push` on a full ring
    pub rejected: AtomicU32,
}

impl RingStats {
    const fn new() -> Self {
        Self {
            pushed: AtomicU32::new(0),
            popped: AtomicU32::new(0),
            overwritten: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
        }
    }

    /// Copy the counters out
    pub fn snapshot(&self) -> RingStatsSnapshot {
        RingStatsSnapshot {
            pushed: self.pushed.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.pushed.store(0, Ordering::Relaxed);
        self.popped.store(0, Ordering::Relaxed);
        self.overwritten.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

/// Plain copy of [`RingStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingStatsSnapshot {
    /// Items accepted by either push flavour
    pub pushed: u32,
    /// Items handed to the consumer
    pub popped: u32,
    /// Items dropped by `push_overwrite`
    pub overwritten: u32,
    /// Items refused by `push`
    pub rejected: u32,
}

/// Bounded SPSC ring of `N` slots (`N - 1` usable)
///
/// `N` must be a power of two and at least 2; other values fail to compile.
/// The ring itself only offers read-only monitoring. Pushing and popping go
/// through the [`Producer`] and [`Consumer`] handles returned by
/// [`split`](Self::split), which is what enforces one writer and one reader.
///
/// ## Memory Layout
///
/// ```text
/// SampleRing<Sample, 4096> layout:
/// ├── slots: 4096 * 16 = 64 KiB
/// ├── head:  8 bytes
/// ├── tail:  8 bytes
/// └── stats: 16 bytes
/// ```
///
/// ## Example Usage
///
/// ```rust
/// use breathguard_core::queue::SampleRing;
///
/// let mut ring = SampleRing::<u32, 8>::new();
/// let (mut producer, mut consumer) = ring.split();
///
/// assert!(producer.push(1));
/// assert!(producer.push(2));
/// assert_eq!(consumer.pop(), Some(1));
///
/// let mut out = [0u32; 4];
/// assert_eq!(consumer.pop_batch(&mut out, 4), 1);
/// assert_eq!(out[0], 2);
/// ```
pub struct SampleRing<T: Copy, const N: usize> {
    slots: [UnsafeCell<MaybeUninit<T>>; N],
    /// Next write position (published by the producer only)
    head: AtomicUsize,
    /// Next read position
    tail: AtomicUsize,
    stats: RingStats,
}

// Slots are only written by the single producer at `head` and only kept by
// the consumer after a successful claim of `tail`.
unsafe impl<T: Copy + Send, const N: usize> Sync for SampleRing<T, N> {}

impl<T: Copy, const N: usize> SampleRing<T, N> {
    const MASK: usize = N - 1;

    const CAPACITY_OK: () = assert!(
        N >= MIN_RING_CAPACITY && N.is_power_of_two(),
        "ring size must be a power of two and at least 2"
    );

    /// Create an empty ring
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;

        Self {
            slots: core::array::from_fn(|_| UnsafeCell::new(MaybeUninit::uninit())),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            stats: RingStats::new(),
        }
    }

    /// Split into the producer and consumer handles
    ///
    /// The handles borrow the ring, so it cannot be dropped or split again
    /// while either is alive.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    /// Discard all items and zero the statistics
    pub fn clear(&mut self) {
        *self.head.get_mut() = 0;
        *self.tail.get_mut() = 0;
        self.stats.reset();
    }

    /// Usable capacity, `N - 1`
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Advisory occupancy; may be stale by the time it is read
    pub fn size_approx(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail).min(N - 1)
    }

    /// Whether the ring looked empty at the time of the call
    pub fn is_empty(&self) -> bool {
        self.size_approx() == 0
    }

    /// Ring statistics
    pub fn stats(&self) -> &RingStats {
        &self.stats
    }

    fn write_slot(&self, position: usize, value: T) {
        // SAFETY: only the producer writes, and only at `head`, which the
        // consumer never claims before the following Release store.
        unsafe {
            (*self.slots[position & Self::MASK].get()).write(value);
        }
    }

    fn try_enqueue(&self, value: T) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= N - 1 {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.write_slot(head, value);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn enqueue_overwrite(&self, value: T) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let mut kept_all = true;

        if head.wrapping_sub(tail) >= N - 1 {
            // A failed exchange means the consumer freed a slot meanwhile
            if self
                .tail
                .compare_exchange(tail, tail.wrapping_add(1), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                kept_all = false;
                self.stats.overwritten.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.write_slot(head, value);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        kept_all
    }

    fn dequeue(&self) -> Option<T> {
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let head = self.head.load(Ordering::Acquire);

            if tail == head {
                return None;
            }

            // SAFETY: the slot at `tail` was published by the Release store of
            // `head` observed above. This is a seqlock-style optimistic read:
            // an overwrite writes the slot just behind `tail`, so the producer
            // only reaches this slot after two overwrites, each of which moves
            // `tail` first. The copy can therefore overlap a write only if
            // `tail` has changed, and then the claim below fails and the
            // torn copy is discarded unread. It stays `MaybeUninit` until the
            // claim succeeds, and `T: Copy` means dropping it runs no code.
            // The overlapping access is still a data race in the abstract
            // memory model; it is confined to this volatile byte copy.
            let copy: MaybeUninit<T> =
                unsafe { ptr::read_volatile(self.slots[tail & Self::MASK].get()) };

            if self
                .tail
                .compare_exchange(tail, tail.wrapping_add(1), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.stats.popped.fetch_add(1, Ordering::Relaxed);
                // SAFETY: claim succeeded, so the slot was fully written and
                // not reclaimed while it was copied.
                return Some(unsafe { copy.assume_init() });
            }

            // Producer dropped this item while we were reading it
            core::hint::spin_loop();
        }
    }
}

impl<T: Copy, const N: usize> Default for SampleRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> core::fmt::Debug for SampleRing<T, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleRing")
            .field("capacity", &(N - 1))
            .field("size_approx", &self.size_approx())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// Writing half of a [`SampleRing`]
///
/// Not `Clone`: exactly one producer exists per split.
#[derive(Debug)]
pub struct Producer<'a, T: Copy, const N: usize> {
    ring: &'a SampleRing<T, N>,
}

impl<'a, T: Copy, const N: usize> Producer<'a, T, N> {
    /// Enqueue if there is room
    ///
    /// Returns `false` without touching the ring when it is full.
    pub fn push(&mut self, value: T) -> bool {
        self.ring.try_enqueue(value)
    }

    /// Enqueue unconditionally, dropping the oldest item when full
    ///
    /// Returns `false` when an item was dropped to make room.
    pub fn push_overwrite(&mut self, value: T) -> bool {
        self.ring.enqueue_overwrite(value)
    }

    /// Advisory occupancy
    pub fn size_approx(&self) -> usize {
        self.ring.size_approx()
    }

    /// Statistics of the underlying ring
    pub fn stats(&self) -> &RingStats {
        self.ring.stats()
    }
}

/// Reading half of a [`SampleRing`]
#[derive(Debug)]
pub struct Consumer<'a, T: Copy, const N: usize> {
    ring: &'a SampleRing<T, N>,
}

impl<'a, T: Copy, const N: usize> Consumer<'a, T, N> {
    /// Dequeue the oldest item
    pub fn pop(&mut self) -> Option<T> {
        self.ring.dequeue()
    }

    /// Dequeue up to `max` items into the front of `out`
    ///
    /// Stops early when the ring runs empty; returns how many were written.
    pub fn pop_batch(&mut self, out: &mut [T], max: usize) -> usize {
        let limit = max.min(out.len());
        let mut count = 0;
        while count < limit {
            match self.ring.dequeue() {
                Some(value) => {
                    out[count] = value;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Advisory occupancy
    pub fn size_approx(&self) -> usize {
        self.ring.size_approx()
    }

    /// Statistics of the underlying ring
    pub fn stats(&self) -> &RingStats {
        self.ring.stats()
    }
}
