use crate::error::Error;

use futures::task::AtomicWaker;

use std::sync::atomic::{AtomicU8, Ordering};
use std::task::Waker;

/// The deferred computation has not been triggered yet.
pub(crate) const IDLE: u8 = 0;

/// The owning task was run; the computation resumes normally.
pub(crate) const STARTED: u8 = 1;

/// The owning task was dropped before running.
///
/// The computation is still resumed, and observes [`Error::BrokenTask`]
/// at its resume point.
pub(crate) const INTERRUPTED: u8 = 2;

/// Observable lifecycle of a [`TaskState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Idle,
    Started,
    Interrupted,
}

/// Shared record between a [`Task`](super::Task) and the computation it
/// resumes.
///
/// The state moves exactly once, either `idle -> started` (the task ran)
/// or `idle -> interrupted` (the task was dropped). Both transitions wake
/// the stored handle, so the suspended computation always gets to observe
/// the outcome.
pub struct TaskState {
    /// One of `IDLE`, `STARTED`, `INTERRUPTED`.
    status: AtomicU8,

    /// Resumption point of the suspended computation. Taken when woken.
    handle: AtomicWaker,
}

impl TaskState {
    /// Creates an idle state with no resumption point yet.
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(IDLE),
            handle: AtomicWaker::new(),
        }
    }

    /// Creates an idle state that resumes `handle`.
    pub fn with_handle(handle: Waker) -> Self {
        let state = Self::new();
        state.handle.register(&handle);
        state
    }

    /// Sets the resumption point, replacing the previous one.
    ///
    /// A computation polled again with a different waker refreshes it
    /// here before checking [`status`](Self::status), so a concurrent
    /// trigger always wakes the latest one.
    pub fn set_handle(&self, handle: &Waker) {
        self.handle.register(handle);
    }

    /// Returns the current status.
    pub fn status(&self) -> TaskStatus {
        match self.status.load(Ordering::Acquire) {
            IDLE => TaskStatus::Idle,
            STARTED => TaskStatus::Started,
            _ => TaskStatus::Interrupted,
        }
    }

    /// Resume-point check: fails with [`Error::BrokenTask`] if the owning
    /// task was dropped instead of run.
    pub fn resumed(&self) -> Result<(), Error> {
        match self.status() {
            TaskStatus::Interrupted => Err(Error::BrokenTask),
            _ => Ok(()),
        }
    }

    /// Triggers normal resumption.
    ///
    /// # Panics
    ///
    /// Panics if the state was already triggered.
    pub(crate) fn call(&self) {
        let swapped = self
            .status
            .compare_exchange(IDLE, STARTED, Ordering::AcqRel, Ordering::Acquire);

        assert!(swapped.is_ok(), "task state was already triggered");

        self.wake();
    }

    /// Triggers interruption. No-op unless the state is idle.
    pub(crate) fn interrupt(&self) {
        if self
            .status
            .compare_exchange(IDLE, INTERRUPTED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        tracing::trace!("task interrupted before running");
        self.wake();
    }

    fn wake(&self) {
        self.handle.wake();
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}
