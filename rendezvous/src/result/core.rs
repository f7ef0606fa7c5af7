use super::ResultStatus;
use super::shared::SharedResult;
use super::state::{Continuation, ResultState};
use crate::error::Error;
use crate::runtime::executor::Executor;
use crate::runtime::task::{Task, TaskState, TaskStatus};

use std::fmt;
use std::future::IntoFuture;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

const CLASS: &str = "result";

/// The consuming side of an asynchronous computation.
///
/// An `AsyncResult` is exclusive: its outcome is moved out exactly once,
/// either by blocking ([`get`](Self::get)) or by awaiting it. Use
/// [`share`](Self::share) when several consumers need the same outcome.
///
/// A default-constructed result is empty; every operation on it fails
/// with [`Error::Empty`].
pub struct AsyncResult<T> {
    state: Option<Arc<ResultState<T>>>,
}

impl<T> AsyncResult<T> {
    pub(crate) fn from_state(state: Arc<ResultState<T>>) -> Self {
        Self { state: Some(state) }
    }

    /// Creates a result that already holds `value`.
    pub fn ready(value: T) -> Self {
        Self::from_state(Arc::new(ResultState::completed(Ok(value))))
    }

    /// Creates a result that already holds `error`.
    pub fn failed(error: Error) -> Self {
        Self::from_state(Arc::new(ResultState::completed(Err(error))))
    }

    /// Returns `true` if this result references no computation.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    fn state(&self, method: &'static str) -> Result<&Arc<ResultState<T>>, Error> {
        self.state.as_ref().ok_or(Error::empty(CLASS, method))
    }

    /// Returns whether the outcome is available, and of which kind.
    pub fn status(&self) -> Result<ResultStatus, Error> {
        Ok(ResultStatus::of(self.state("status")?))
    }

    /// Blocks until the outcome is available.
    pub fn wait(&self) -> Result<(), Error> {
        self.state("wait")?.wait_until(None);
        Ok(())
    }

    /// Blocks until the outcome is available or `timeout` elapses.
    ///
    /// Returns [`ResultStatus::Idle`] on timeout.
    pub fn wait_for(&self, timeout: Duration) -> Result<ResultStatus, Error> {
        let state = self.state("wait_for")?;

        match Instant::now().checked_add(timeout) {
            Some(deadline) => state.wait_until(Some(deadline)),
            None => state.wait_until(None),
        };

        Ok(ResultStatus::of(state))
    }

    /// Blocks until the outcome is available or `deadline` is reached.
    ///
    /// Returns [`ResultStatus::Idle`] on timeout.
    pub fn wait_until(&self, deadline: Instant) -> Result<ResultStatus, Error> {
        let state = self.state("wait_until")?;
        state.wait_until(Some(deadline));
        Ok(ResultStatus::of(state))
    }

    /// Blocks until the outcome is available and moves it out.
    pub fn get(self) -> Result<T, Error> {
        let state = self.state("get")?;
        state.wait_until(None);
        state.take()
    }

    /// Waits for the outcome without consuming it.
    ///
    /// The returned future resolves once the outcome is available; the
    /// result stays retrievable afterwards.
    pub fn resolve(&mut self) -> Resolve<'_, T> {
        Resolve { result: self }
    }

    /// Awaits the outcome, then continues on `executor`.
    ///
    /// The awaiting computation is always rescheduled, even if the outcome
    /// was already available. If the executor drops the resuming task the
    /// await fails with [`Error::BrokenTask`].
    pub fn resume_via(self, executor: Arc<dyn Executor>) -> Await<T> {
        Await {
            state: self.state,
            method: "resume_via",
            via: Some(executor),
            resume: None,
        }
    }

    /// Converts this result into a shared one.
    pub fn share(self) -> SharedResult<T>
    where
        T: Send + Sync + 'static,
    {
        match self.state {
            Some(state) => SharedResult::from_state(state),
            None => SharedResult::default(),
        }
    }

    pub(crate) fn inner(&self) -> Option<&Arc<ResultState<T>>> {
        self.state.as_ref()
    }
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self { state: None }
    }
}

impl<T> fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResult")
            .field("status", &self.state.as_deref().map(ResultStatus::of))
            .finish()
    }
}

impl<T> IntoFuture for AsyncResult<T> {
    type Output = Result<T, Error>;
    type IntoFuture = Await<T>;

    fn into_future(self) -> Self::IntoFuture {
        Await {
            state: self.state,
            method: "await",
            via: None,
            resume: None,
        }
    }
}

/// Future that moves the outcome out of an [`AsyncResult`].
#[must_use = "futures do nothing unless awaited"]
pub struct Await<T> {
    state: Option<Arc<ResultState<T>>>,
    method: &'static str,

    /// Executor to continue on, for [`AsyncResult::resume_via`].
    via: Option<Arc<dyn Executor>>,

    /// Set once the resuming task has been handed out.
    resume: Option<Arc<TaskState>>,
}

impl<T> Await<T> {
    fn resumed(&self, state: &ResultState<T>, task: &TaskState) -> Poll<Result<T, Error>> {
        match task.status() {
            TaskStatus::Idle => Poll::Pending,
            TaskStatus::Started => Poll::Ready(state.take()),
            TaskStatus::Interrupted => Poll::Ready(Err(Error::BrokenTask)),
        }
    }
}

impl<T> Future for Await<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(state) = self.state.clone() else {
            return Poll::Ready(Err(Error::empty(CLASS, self.method)));
        };

        if let Some(task) = &self.resume {
            task.set_handle(cx.waker());
            return self.resumed(&state, task);
        }

        let Some(executor) = self.via.clone() else {
            return if state.poll_ready(cx.waker()) {
                Poll::Ready(state.take())
            } else {
                Poll::Pending
            };
        };

        let task = Arc::new(TaskState::with_handle(cx.waker().clone()));
        self.resume = Some(task.clone());

        let continuation = Continuation::Via {
            executor: executor.clone(),
            state: task.clone(),
        };

        if state.register(continuation).is_err() {
            executor.enqueue(Task::new(task.clone()))?;
        }

        self.resumed(&state, &task)
    }
}

impl<T> Drop for Await<T> {
    fn drop(&mut self) {
        if let Some(state) = &self.state {
            state.rewind();
        }
    }
}

/// Future returned by [`AsyncResult::resolve`].
#[must_use = "futures do nothing unless awaited"]
pub struct Resolve<'a, T> {
    result: &'a mut AsyncResult<T>,
}

impl<T> Future for Resolve<'_, T> {
    type Output = Result<(), Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let state = self.result.state("resolve")?;

        if state.poll_ready(cx.waker()) {
            Poll::Ready(Ok(()))
        } else {
            Poll::Pending
        }
    }
}

impl<T> Drop for Resolve<'_, T> {
    fn drop(&mut self) {
        if let Some(state) = &self.result.state {
            state.rewind();
        }
    }
}
