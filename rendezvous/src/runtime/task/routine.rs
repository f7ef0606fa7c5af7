use super::core::Task;
use super::state::TaskState;
use super::waker::make_waker;
use crate::error::Error;
use crate::result::{AsyncResult, channel};

use futures::FutureExt;

use std::cell::UnsafeCell;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::Context;

/// Not being polled.
const IDLE: usize = 0;

/// Being polled by exactly one thread.
const RUNNING: usize = 1;

/// Woken while being polled; the polling thread polls once more.
const NOTIFIED: usize = 2;

/// Returned `Poll::Ready`; the future has been dropped.
const COMPLETED: usize = 3;

type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A computation driven by the engine itself.
///
/// A routine has no home thread: waking it polls the future right away on
/// the waking thread. Whoever resumes a routine (a task run by an
/// executor, a producer completing a result) therefore decides where it
/// continues. Wakes that arrive while it is being polled are coalesced
/// into one extra poll by the polling thread.
pub(crate) struct Routine {
    /// Wrapped in `UnsafeCell` for interior mutability during `poll`;
    /// `None` once completed.
    future: UnsafeCell<Option<BoxedFuture>>,

    /// One of `IDLE`, `RUNNING`, `NOTIFIED`, `COMPLETED`.
    state: AtomicUsize,
}

// The future is only touched by the thread that moved the state to RUNNING.
unsafe impl Send for Routine {}
unsafe impl Sync for Routine {}

impl Routine {
    pub(crate) fn new<F>(future: F) -> Arc<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Arc::new(Self {
            future: UnsafeCell::new(Some(Box::pin(future))),
            state: AtomicUsize::new(IDLE),
        })
    }

    /// Polls the routine on the calling thread, or marks it notified if
    /// another thread is polling it right now.
    pub(crate) fn resume(self: &Arc<Self>) {
        let mut current = self.state.load(Ordering::Acquire);

        loop {
            let next = match current {
                IDLE => RUNNING,
                RUNNING => NOTIFIED,
                _ => return,
            };

            match self
                .state
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) if next == NOTIFIED => return,
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        loop {
            // Safety: the RUNNING state guarantees that no other thread
            // touches the future.
            let slot = unsafe { &mut *self.future.get() };
            let Some(future) = slot.as_mut() else {
                self.state.store(COMPLETED, Ordering::Release);
                return;
            };

            if future.as_mut().poll(&mut cx).is_ready() {
                *slot = None;
                self.state.store(COMPLETED, Ordering::Release);
                return;
            }

            if self
                .state
                .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }

            // Woken during the poll: take the notification and poll again.
            self.state.store(RUNNING, Ordering::Release);
        }
    }
}

/// Binds `future` to a fresh task.
///
/// The returned task resumes a routine that runs `future` to completion
/// and publishes its outcome to the returned result; dropping the task
/// instead publishes [`Error::BrokenTask`]. A panic inside `future` is
/// captured as [`Error::Panicked`]. `done` runs after the outcome is
/// published, on whichever thread finished the routine.
pub(crate) fn bind<F, T, D>(future: F, done: D) -> (Task, AsyncResult<T>)
where
    F: Future<Output = Result<T, Error>> + Send + 'static,
    T: Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let state = Arc::new(TaskState::new());
    let gate = state.clone();
    let (promise, result) = channel();

    let routine = Routine::new(async move {
        let admitted = gate.resumed();
        drop(gate);

        let outcome = match admitted {
            Ok(()) => match AssertUnwindSafe(future).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(Error::from_panic(payload)),
            },
            Err(error) => Err(error),
        };

        promise.complete(outcome);
        done();
    });

    state.set_handle(&make_waker(routine));

    (Task::new(state), result)
}

/// Runs `future` as a routine started on the calling thread.
///
/// The future is polled immediately up to its first suspension point.
pub(crate) fn start<F, T>(future: F) -> AsyncResult<T>
where
    F: Future<Output = Result<T, Error>> + Send + 'static,
    T: Send + 'static,
{
    let (promise, result) = channel();

    let routine = Routine::new(async move {
        let outcome = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => Err(Error::from_panic(payload)),
        };

        promise.complete(outcome);
    });

    routine.resume();
    result
}
