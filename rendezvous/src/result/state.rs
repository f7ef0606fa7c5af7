use crate::error::Error;
use crate::runtime::executor::Executor;
use crate::runtime::task::{Task, TaskState};
use crate::wait::{self, WaitStatus};

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::Waker;
use std::time::Instant;

/// A continuation is stored in the consumer slot.
pub(crate) const CONSUMER_SET: u32 = 1;

/// At least one thread is blocked on the status word.
pub(crate) const CONSUMER_WAITING: u32 = 2;

/// The outcome has been published. Terminal.
pub(crate) const PRODUCER_DONE: u32 = 4;

/// What the producer resumes once the outcome is published.
pub(crate) enum Continuation {
    /// Wake the consumer on the completing thread.
    Inline(Waker),

    /// Enqueue a task on `executor` that resumes the consumer.
    Via {
        executor: Arc<dyn Executor>,
        state: Arc<TaskState>,
    },
}

impl Continuation {
    pub(crate) fn resume(self) {
        match self {
            Continuation::Inline(waker) => waker.wake(),
            Continuation::Via { executor, state } => {
                // A refused task is dropped, which interrupts the consumer.
                if let Err(error) = executor.enqueue(Task::new(state)) {
                    tracing::warn!(%error, "continuation could not be enqueued");
                }
            }
        }
    }
}

/// Synchronization point between one producer and its consumers.
///
/// A single status word arbitrates every interaction:
/// - the producer writes the outcome, then sets `PRODUCER_DONE`;
/// - a cooperative consumer writes its continuation while
///   `CONSUMER_SET` is clear, then sets it;
/// - a blocking consumer sets `CONSUMER_WAITING` and parks on the word.
///
/// Whoever sets its bit second performs the resumption, so a registered
/// continuation is resumed exactly once.
pub(crate) struct ResultState<T> {
    status: AtomicU32,

    /// Written once by the producer before `PRODUCER_DONE` is set.
    outcome: UnsafeCell<Option<Result<T, Error>>>,

    /// Owned by the consumer while `CONSUMER_SET` is clear, and by the
    /// producer once it observed `CONSUMER_SET` while setting `PRODUCER_DONE`.
    consumer: UnsafeCell<Option<Continuation>>,
}

unsafe impl<T: Send> Send for ResultState<T> {}
unsafe impl<T: Send> Sync for ResultState<T> {}

impl<T> ResultState<T> {
    pub(crate) fn new() -> Self {
        Self {
            status: AtomicU32::new(0),
            outcome: UnsafeCell::new(None),
            consumer: UnsafeCell::new(None),
        }
    }

    /// Creates an already completed state.
    pub(crate) fn completed(outcome: Result<T, Error>) -> Self {
        Self {
            status: AtomicU32::new(PRODUCER_DONE),
            outcome: UnsafeCell::new(Some(outcome)),
            consumer: UnsafeCell::new(None),
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.status.load(Ordering::Acquire) & PRODUCER_DONE != 0
    }

    /// Publishes the outcome and resumes whoever is waiting for it.
    ///
    /// Must be called at most once.
    pub(crate) fn complete(&self, outcome: Result<T, Error>) {
        // Safety: only the single producer writes, and no consumer reads
        // the outcome before observing PRODUCER_DONE.
        unsafe { *self.outcome.get() = Some(outcome) };

        let previous = self.status.fetch_or(PRODUCER_DONE, Ordering::AcqRel);
        debug_assert_eq!(previous & PRODUCER_DONE, 0, "result completed twice");

        if previous & CONSUMER_WAITING != 0 {
            wait::notify_all(&self.status);
        }

        if previous & CONSUMER_SET != 0 {
            // Safety: CONSUMER_SET was observed together with setting
            // PRODUCER_DONE, so the consumer can no longer touch the slot.
            if let Some(continuation) = unsafe { (*self.consumer.get()).take() } {
                continuation.resume();
            }
        }
    }

    /// Withdraws a registered continuation.
    ///
    /// Returns `false` if the producer already completed; the producer
    /// then owns the slot and may be resuming it right now.
    pub(crate) fn rewind(&self) -> bool {
        let mut current = self.status.load(Ordering::Acquire);

        loop {
            if current & PRODUCER_DONE != 0 {
                return false;
            }

            if current & CONSUMER_SET == 0 {
                return true;
            }

            match self.status.compare_exchange_weak(
                current,
                current & !CONSUMER_SET,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        // Safety: CONSUMER_SET is clear, the slot belongs to the consumer.
        drop(unsafe { (*self.consumer.get()).take() });
        true
    }

    /// Registers `continuation`, replacing any previous one.
    ///
    /// Returns the continuation back if the producer already completed;
    /// the caller proceeds without suspending.
    pub(crate) fn register(&self, continuation: Continuation) -> Result<(), Continuation> {
        if !self.rewind() {
            return Err(continuation);
        }

        // Safety: CONSUMER_SET is clear after a successful rewind.
        unsafe { *self.consumer.get() = Some(continuation) };

        let previous = self.status.fetch_or(CONSUMER_SET, Ordering::AcqRel);
        if previous & PRODUCER_DONE != 0 {
            // The producer did not see CONSUMER_SET: the slot is still ours.
            let continuation = unsafe { (*self.consumer.get()).take() };
            self.status.fetch_and(!CONSUMER_SET, Ordering::AcqRel);

            return match continuation {
                Some(continuation) => Err(continuation),
                None => Ok(()),
            };
        }

        Ok(())
    }

    /// Registers `waker` unless the outcome is already available.
    ///
    /// Returns `true` when the outcome is ready.
    pub(crate) fn poll_ready(&self, waker: &Waker) -> bool {
        if self.is_done() {
            return true;
        }

        self.register(Continuation::Inline(waker.clone())).is_err()
    }

    /// Blocks the calling thread until the outcome is published or
    /// `deadline` passes. Returns `true` when the outcome is ready.
    pub(crate) fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let previous = self.status.fetch_or(CONSUMER_WAITING, Ordering::AcqRel);
        if previous & PRODUCER_DONE != 0 {
            return true;
        }

        loop {
            let current = self.status.load(Ordering::Acquire);
            if current & PRODUCER_DONE != 0 {
                return true;
            }

            match deadline {
                None => wait::wait(&self.status, current),
                Some(deadline) => {
                    if wait::wait_until(&self.status, current, deadline) == WaitStatus::TimedOut {
                        return self.is_done();
                    }
                }
            }
        }
    }

    /// Moves the outcome out.
    ///
    /// Must only be called by the exclusive consumer after observing
    /// completion.
    pub(crate) fn take(&self) -> Result<T, Error> {
        debug_assert!(self.is_done());

        // Safety: PRODUCER_DONE was observed with acquire ordering and the
        // exclusive consumer is the only reader.
        unsafe { (*self.outcome.get()).take() }.unwrap_or(Err(Error::BrokenTask))
    }

    /// Borrows the outcome. Returns `None` until completion.
    pub(crate) fn outcome(&self) -> Option<&Result<T, Error>> {
        if !self.is_done() {
            return None;
        }

        // Safety: the outcome is never written again after PRODUCER_DONE.
        unsafe { (*self.outcome.get()).as_ref() }
    }
}
