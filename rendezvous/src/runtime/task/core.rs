use super::state::TaskState;

use std::fmt;
use std::sync::Arc;

/// A move-only, run-at-most-once unit of work.
///
/// A non-empty `Task` references exactly one suspended computation
/// through its [`TaskState`]. Running the task resumes that computation
/// normally; dropping it without running interrupts the computation,
/// which then observes [`Error::BrokenTask`](crate::Error::BrokenTask).
/// Exactly one of the two happens.
///
/// Executors only ever move tasks around, run them, or drop them, which
/// is what lets shutdown discard queued work without leaking anything.
#[derive(Default)]
pub struct Task {
    state: Option<Arc<TaskState>>,
}

impl Task {
    /// Creates a task that triggers `state` when run.
    pub fn new(state: Arc<TaskState>) -> Self {
        Self { state: Some(state) }
    }

    /// Returns `true` if the task references no computation.
    ///
    /// Running or dropping an empty task does nothing.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    /// Resumes the referenced computation on the calling thread.
    ///
    /// The computation runs until its next suspension point before this
    /// returns.
    pub fn run(mut self) {
        if let Some(state) = self.state.take() {
            state.call();
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.interrupt();
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("empty", &self.is_empty())
            .finish()
    }
}
