//! A lock-free, unbounded, multi-producer single-consumer LIFO channel.
//!
//! The chain is an intrusive Treiber stack: each heap node embeds its own
//! `next` link and the channel head is a single atomic pointer. Producers
//! splice nodes onto the head with a compare-and-swap retry loop; the
//! consumer detaches one node ([`Receiver::pop`]) or the whole chain in a
//! single exchange ([`Receiver::dequeue_all`], [`Receiver::drain`]).
//!
//! Ordering is LIFO, not FIFO. The value pushed last is the value popped
//! first, and pushes performed by one thread are observed in strictly
//! reverse order. Across threads the only guarantee is the total order of
//! the successful head updates.
//!
//! Single-consumer exclusivity is a type-level contract: [`Receiver`] is
//! `Send` but neither `Sync` nor `Clone`, so at most one thread can ever be
//! inside a consumer operation. [`Sender`] is `Clone + Send + Sync` and may
//! be used from any number of threads.
//!
//! No operation blocks. A producer may spin through CAS retries under
//! contention (lock-free, not wait-free), and the consumer side completes
//! in a bounded number of its own atomic steps between pushes.
//!
//! # Examples
//!
//! ```
//! use lifo_channel::channel;
//!
//! let (tx, rx) = channel();
//!
//! std::thread::scope(|s| {
//!     for t in 0..4u32 {
//!         let tx = tx.clone();
//!         s.spawn(move || {
//!             for i in 0..100 {
//!                 tx.push(t * 100 + i);
//!             }
//!         });
//!     }
//! });
//!
//! let mut count = 0;
//! rx.dequeue_all(|_| count += 1);
//! assert_eq!(count, 400);
//! assert!(rx.is_empty());
//! ```

use std::marker::PhantomData;
use std::ptr;
use std::sync::Arc;

#[cfg(loom)]
use loom::sync::atomic::{AtomicPtr, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicPtr, Ordering};

use crossbeam_utils::Backoff;

use crate::cache_padded::CachePadded;

/// One chain link. Owned by the channel from the moment the publishing CAS
/// succeeds until the consumer detaches it, at which point the value moves
/// out and the node is freed.
struct Node<T> {
    value: T,
    /// Written only before the node is published, read only by the single
    /// consumer after an acquire load of the head, so a plain field is
    /// sufficient.
    next: *mut Node<T>,
}

/// State shared by both halves: the head pointer, null when empty.
///
/// Every mutation of `head` is a compare-and-swap or an exchange, never a
/// plain store.
struct Shared<T> {
    head: CachePadded<AtomicPtr<Node<T>>>,
}

unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Teardown is dequeue_all with a no-op callback: every node still
        // chained is freed, on every exit path.
        let mut node = self.head.load(Ordering::Relaxed);
        while !node.is_null() {
            let boxed = unsafe { Box::from_raw(node) };
            node = boxed.next;
        }
    }
}

/// The producing half of the channel.
///
/// Cloneable and shareable; any number of threads may push concurrently,
/// with each other and with the consumer.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
}

unsafe impl<T: Send> Send for Sender<T> {}
unsafe impl<T: Send> Sync for Sender<T> {}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// The consuming half of the channel.
///
/// `Send` but neither `Sync` nor `Clone`: at most one thread can run
/// `pop`/`dequeue_all`/`drain` at any time, which is the whole of the
/// single-consumer contract, enforced at compile time with no runtime
/// checks.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
    /// Suppresses the auto traits; `Send` is restored manually below.
    _not_sync: PhantomData<*const ()>,
}

unsafe impl<T: Send> Send for Receiver<T> {}

/// Creates a new unbounded LIFO channel, returning its two halves.
///
/// # Examples
///
/// ```
/// let (tx, rx) = lifo_channel::channel();
/// tx.push('a');
/// assert_eq!(rx.pop(), Some('a'));
/// assert_eq!(rx.pop(), None);
/// ```
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let shared = Arc::new(Shared {
        head: CachePadded::new(AtomicPtr::new(ptr::null_mut())),
    });
    (
        Sender {
            shared: shared.clone(),
        },
        Receiver {
            shared,
            _not_sync: PhantomData,
        },
    )
}

impl<T> Sender<T> {
    /// Pushes `value` onto the top of the chain.
    ///
    /// Never blocks. Under contention the CAS loop may retry an unbounded
    /// but finite number of times; each failed attempt means another
    /// producer succeeded. The payload write is release-published, so a
    /// consumer that observes the node also observes its value.
    pub fn push(&self, value: T) {
        let node = Box::into_raw(Box::new(Node {
            value,
            next: ptr::null_mut(),
        }));
        let backoff = Backoff::new();
        let mut head = self.shared.head.load(Ordering::Relaxed);
        loop {
            // Unpublished until the CAS succeeds, so this write cannot race.
            unsafe { (*node).next = head };
            match self.shared.head.compare_exchange_weak(
                head,
                node,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(current) => {
                    head = current;
                    backoff.spin();
                }
            }
        }
    }
}

impl<T> Receiver<T> {
    /// Removes and returns the most recently pushed value, or `None` if
    /// the chain is empty.
    ///
    /// The emptiness check and the detach are folded into a single CAS
    /// attempt per retry, with the head re-read fresh each time, so a push
    /// landing between the check and the detach is never overwritten.
    pub fn pop(&self) -> Option<T> {
        let backoff = Backoff::new();
        loop {
            let head = self.shared.head.load(Ordering::Acquire);
            if head.is_null() {
                return None;
            }
            // Only this consumer frees nodes, so `head` stays alive across
            // the attempt and its link may be read before the detach commits.
            let next = unsafe { (*head).next };
            match self
                .shared
                .head
                .compare_exchange(head, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let node = unsafe { Box::from_raw(head) };
                    return Some(node.value);
                }
                Err(_) => backoff.spin(),
            }
        }
    }

    /// Detaches the entire chain in one atomic exchange and invokes
    /// `callback` once per value, most recently pushed first.
    ///
    /// A push racing the exchange lands either wholly in the detached
    /// chain or on the freshly emptied head; no value is lost, split or
    /// duplicated. If the callback panics, the not-yet-visited remainder
    /// is still freed. Consumer calls re-entered from inside the callback
    /// observe only values pushed after the detach.
    pub fn dequeue_all(&self, mut callback: impl FnMut(T)) {
        for value in self.drain() {
            callback(value);
        }
    }

    /// Detaches the entire chain in one atomic exchange and returns an
    /// iterator over the detached values, most recently pushed first.
    ///
    /// The detach happens here, not lazily: values pushed after this call
    /// are not yielded. Dropping the iterator drops every value it has not
    /// yet yielded and frees their nodes.
    pub fn drain(&self) -> Drain<'_, T> {
        Drain {
            node: self.shared.head.swap(ptr::null_mut(), Ordering::AcqRel),
            _receiver: PhantomData,
        }
    }

    /// Returns `true` if the chain is currently empty.
    ///
    /// Exact on the consumer thread between its own operations; anywhere
    /// else it is a racy snapshot.
    pub fn is_empty(&self) -> bool {
        self.shared.head.load(Ordering::Acquire).is_null()
    }
}

/// Iterator over a chain detached by [`Receiver::drain`].
///
/// Owns the detached nodes; whatever is not yielded is dropped and freed
/// when the iterator is dropped.
pub struct Drain<'a, T> {
    node: *mut Node<T>,
    _receiver: PhantomData<&'a Receiver<T>>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.node.is_null() {
            return None;
        }
        let node = unsafe { Box::from_raw(self.node) };
        self.node = node.next;
        Some(node.value)
    }
}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        while self.next().is_some() {}
    }
}
