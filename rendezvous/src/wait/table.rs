//! Portable fallback for the wait service.
//!
//! A fixed array of buckets, each guarded by a mutex. A blocked thread
//! hashes its address to a bucket and parks on a node of its own, so two
//! addresses sharing a bucket never wake each other's waiters.

use super::AtomicWait;
use crate::utils::Slab;
use crate::utils::math::next_prime;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, LazyLock, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

/// Bucket count used when the hardware concurrency cannot be determined.
const DEFAULT_BUCKETS: usize = 37;

/// One parked thread.
struct WaitNode {
    /// Address of the atomic the thread is blocked on.
    address: usize,
    /// Private condition variable of the parked thread.
    condvar: Arc<Condvar>,
    /// Set by a notifier that selected this node.
    notified: bool,
}

/// A hashed table of wait buckets emulating a futex.
///
/// The process-wide instance used by the wait service on platforms
/// without a native primitive is created lazily on first use and never
/// torn down. Independent tables can be built with
/// [`with_buckets`](Self::with_buckets).
pub struct WaitTable {
    buckets: Box<[Mutex<Slab<WaitNode>>]>,
}

impl WaitTable {
    /// Creates a table sized for this machine.
    ///
    /// The bucket count is the smallest prime not below twice the number
    /// of hardware threads, or 37 when that number is unavailable.
    pub fn new() -> Self {
        let buckets = thread::available_parallelism()
            .map(|n| next_prime(2 * n.get()))
            .unwrap_or(DEFAULT_BUCKETS);

        Self::with_buckets(buckets)
    }

    /// Creates a table with exactly `buckets` buckets.
    ///
    /// # Panics
    ///
    /// Panics if `buckets == 0`.
    pub fn with_buckets(buckets: usize) -> Self {
        assert!(buckets > 0, "a wait table needs at least one bucket");

        tracing::debug!(buckets, "wait table created");

        Self {
            buckets: (0..buckets).map(|_| Mutex::new(Slab::new(4))).collect(),
        }
    }

    /// Returns the process-wide table, creating it on first use.
    pub fn global() -> &'static WaitTable {
        &GLOBAL
    }

    /// Returns the number of buckets.
    pub fn buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, address: usize) -> MutexGuard<'_, Slab<WaitNode>> {
        let index = (address / size_of::<u32>()) % self.buckets.len();
        self.buckets[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, atom: &AtomicU32, all: bool) {
        let address = atom.as_ptr() as usize;
        let mut nodes = self.bucket(address);

        for node in nodes.iter_mut() {
            if node.address != address || node.notified {
                continue;
            }

            node.notified = true;
            node.condvar.notify_one();

            if !all {
                break;
            }
        }
    }
}

impl Default for WaitTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicWait for WaitTable {
    fn wait(&self, atom: &AtomicU32, old: u32, deadline: Option<Instant>) {
        let address = atom.as_ptr() as usize;
        let mut nodes = self.bucket(address);

        // Re-check under the bucket lock: a notifier changes the value
        // before taking this lock, so either we see the new value or the
        // notifier sees our node.
        if atom.load(Ordering::Acquire) != old {
            return;
        }

        let condvar = Arc::new(Condvar::new());
        let key = nodes.insert(WaitNode {
            address,
            condvar: condvar.clone(),
            notified: false,
        });

        loop {
            if nodes.get_mut(key).is_none_or(|node| node.notified) {
                break;
            }

            nodes = match deadline {
                None => condvar
                    .wait(nodes)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }

                    condvar
                        .wait_timeout(nodes, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }

        nodes.remove(key);
    }

    fn notify_one(&self, atom: &AtomicU32) {
        self.notify(atom, false);
    }

    fn notify_all(&self, atom: &AtomicU32) {
        self.notify(atom, true);
    }
}

static GLOBAL: LazyLock<WaitTable> = LazyLock::new(WaitTable::new);
