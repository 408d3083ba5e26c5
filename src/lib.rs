//! # `lifo-channel` - Lock-free MPSC LIFO hand-off channel
//!
//! A lock-free, intrusive, singly-linked LIFO container supporting many
//! concurrent producer threads and exactly one consumer thread at a time.
//! It is a leaf synchronization primitive: a hand-off channel transferring
//! ownership of values between threads without blocking producers and
//! without a mutex.
//!
//! ## Guarantees
//!
//! ### Memory safety
//! - **Single-owner nodes**: every node is owned by the channel from the
//!   moment its publishing CAS succeeds until the consumer detaches it;
//!   ownership then moves to the caller (`pop`) or the callback/iterator
//!   (`dequeue_all`/`drain`) and the node is freed exactly once.
//! - **No ABA exposure**: nodes are never pooled or reused. A producer's
//!   in-flight CAS only compares the head pointer and never dereferences
//!   it, and the single consumer is the only thread that frees nodes.
//! - **Compile-time consumer exclusivity**: [`Receiver`] is `Send` but
//!   neither `Sync` nor `Clone`, so the multi-producer/single-consumer
//!   contract cannot be violated from safe code and needs no runtime
//!   detection.
//!
//! ### Progress
//! - **Lock-free, not wait-free**: an individual `push` may retry its CAS
//!   an unbounded but finite number of times under contention; every failed
//!   attempt means some other thread succeeded. Nothing ever sleeps on an
//!   OS primitive.
//! - **Ordering**: successful publishes use release semantics and detaches
//!   use acquire semantics, so a consumer that observes a node observes its
//!   payload. Per producer thread, later pushes sit strictly shallower in
//!   the chain; across threads only the CAS total order holds.
//!
//! ## Non-goals
//!
//! No bounded capacity, no multiple concurrent consumers, no FIFO ordering,
//! no blocking receive. The element inserted last is removed first; this is
//! stack discipline on purpose, not a queue with a bug.
//!
//! ## Example
//!
//! ```rust
//! let (tx, rx) = lifo_channel::channel();
//!
//! tx.push(1);
//! tx.push(2);
//! tx.push(3);
//!
//! assert_eq!(rx.pop(), Some(3));
//! let rest: Vec<i32> = rx.drain().collect();
//! assert_eq!(rest, vec![2, 1]);
//! assert!(rx.is_empty());
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod cache_padded;
pub mod mpsc;

pub use mpsc::{channel, Drain, Receiver, Sender};

// Compile-time layout assertions. Skipped under loom, whose instrumented
// atomics are larger than the types they model.
#[cfg(not(loom))]
const _: () = {
    use core::mem;

    // Each half is a single pointer to the shared state.
    assert!(mem::size_of::<Sender<u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<Receiver<u64>>() == mem::size_of::<usize>());

    // The head owns its cache line.
    assert!(mem::align_of::<cache_padded::CachePadded<u8>>() == 128);
};
