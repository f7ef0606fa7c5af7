use super::ResultStatus;
use super::state::{Continuation, ResultState};
use crate::error::Error;

use std::future::IntoFuture;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Wake, Waker};
use std::time::{Duration, Instant};

const CLASS: &str = "shared_result";

/// Fan-out point between one result state and many awaiting consumers.
///
/// The shared state is itself the single continuation registered on the
/// underlying result; when the producer completes, it wakes every
/// consumer that registered in the meantime.
struct SharedState<T> {
    inner: Arc<ResultState<T>>,
    waiters: Mutex<Vec<Waker>>,
}

impl<T: Send + Sync> SharedState<T> {
    fn poll_ready(&self, waker: &Waker) -> bool {
        if self.inner.is_done() {
            return true;
        }

        let mut waiters = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);

        // Completion sets the done bit before draining the waiters under
        // this lock, so checking again here cannot miss it.
        if self.inner.is_done() {
            return true;
        }

        if !waiters.iter().any(|w| w.will_wake(waker)) {
            waiters.push(waker.clone());
        }

        false
    }
}

impl<T: Send + Sync> Wake for SharedState<T> {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let waiters = std::mem::take(
            &mut *self.waiters.lock().unwrap_or_else(PoisonError::into_inner),
        );

        for waiter in waiters {
            waiter.wake();
        }
    }
}

/// A result whose outcome can be read by any number of consumers.
///
/// Cloning a `SharedResult` is cheap; every clone observes the same
/// outcome by reference. The outcome lives as long as any clone does.
pub struct SharedResult<T> {
    state: Option<Arc<SharedState<T>>>,
}

impl<T: Send + Sync + 'static> SharedResult<T> {
    pub(crate) fn from_state(inner: Arc<ResultState<T>>) -> Self {
        let state = Arc::new(SharedState {
            inner,
            waiters: Mutex::new(Vec::new()),
        });

        let continuation = Continuation::Inline(Waker::from(state.clone()));
        let _ = state.inner.register(continuation);

        Self { state: Some(state) }
    }
}

impl<T: Send + Sync> SharedResult<T> {
    /// Returns `true` if this result references no computation.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    fn state(&self, method: &'static str) -> Result<&Arc<SharedState<T>>, Error> {
        self.state.as_ref().ok_or(Error::empty(CLASS, method))
    }

    /// Returns whether the outcome is available, and of which kind.
    pub fn status(&self) -> Result<ResultStatus, Error> {
        Ok(ResultStatus::of(&self.state("status")?.inner))
    }

    /// Blocks until the outcome is available.
    pub fn wait(&self) -> Result<(), Error> {
        self.state("wait")?.inner.wait_until(None);
        Ok(())
    }

    /// Blocks until the outcome is available or `timeout` elapses.
    pub fn wait_for(&self, timeout: Duration) -> Result<ResultStatus, Error> {
        let state = self.state("wait_for")?;
        state.inner.wait_until(Instant::now().checked_add(timeout));
        Ok(ResultStatus::of(&state.inner))
    }

    /// Blocks until the outcome is available or `deadline` is reached.
    pub fn wait_until(&self, deadline: Instant) -> Result<ResultStatus, Error> {
        let state = self.state("wait_until")?;
        state.inner.wait_until(Some(deadline));
        Ok(ResultStatus::of(&state.inner))
    }

    /// Blocks until the outcome is available and borrows it.
    ///
    /// A stored error is cloned into every caller.
    pub fn get(&self) -> Result<&T, Error> {
        let state = self.state("get")?;
        state.inner.wait_until(None);
        read(&state.inner)
    }
}

fn read<T>(inner: &ResultState<T>) -> Result<&T, Error> {
    match inner.outcome() {
        Some(Ok(value)) => Ok(value),
        Some(Err(error)) => Err(error.clone()),
        None => Err(Error::BrokenTask),
    }
}

impl<T> Clone for SharedResult<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for SharedResult<T> {
    fn default() -> Self {
        Self { state: None }
    }
}

impl<'a, T: Send + Sync> IntoFuture for &'a SharedResult<T> {
    type Output = Result<&'a T, Error>;
    type IntoFuture = SharedAwait<'a, T>;

    fn into_future(self) -> Self::IntoFuture {
        SharedAwait { result: self }
    }
}

/// Future returned by awaiting a `&SharedResult`.
#[must_use = "futures do nothing unless awaited"]
pub struct SharedAwait<'a, T> {
    result: &'a SharedResult<T>,
}

impl<'a, T: Send + Sync> Future for SharedAwait<'a, T> {
    type Output = Result<&'a T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let result: &'a SharedResult<T> = self.result;
        let state = result.state("await")?;

        if state.poll_ready(cx.waker()) {
            Poll::Ready(read(&state.inner))
        } else {
            Poll::Pending
        }
    }
}
