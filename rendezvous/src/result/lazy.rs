use super::core::AsyncResult;
use crate::error::Error;
use crate::runtime::task;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// A computation that does not start until it is awaited or run.
///
/// Awaiting a `LazyResult` drives the computation inside the awaiting
/// one. [`run`](Self::run) instead starts it eagerly on the calling
/// thread and hands back an [`AsyncResult`].
pub struct LazyResult<T> {
    future: Option<BoxedFuture<T>>,
}

impl<T> LazyResult<T> {
    /// Wraps a not-yet-started computation.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, Error>> + Send + 'static,
    {
        Self {
            future: Some(Box::pin(future)),
        }
    }

    /// Returns `true` if there is no computation to run.
    pub fn is_empty(&self) -> bool {
        self.future.is_none()
    }
}

impl<T: Send + 'static> LazyResult<T> {
    /// Starts the computation on the calling thread.
    ///
    /// The computation runs until its first suspension point before this
    /// returns; the rest runs wherever it is resumed.
    pub fn run(mut self) -> AsyncResult<T> {
        match self.future.take() {
            Some(future) => task::start(future),
            None => AsyncResult::failed(Error::empty("lazy_result", "run")),
        }
    }

    /// Runs the computation and blocks until it finishes.
    pub fn get(self) -> Result<T, Error> {
        self.run().get()
    }
}

impl<T> Default for LazyResult<T> {
    fn default() -> Self {
        Self { future: None }
    }
}

impl<T> Future for LazyResult<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(future) = self.future.as_mut() else {
            return Poll::Ready(Err(Error::empty("lazy_result", "await")));
        };

        let poll = future.as_mut().poll(cx);
        if poll.is_ready() {
            self.future = None;
        }

        poll
    }
}

impl<T> fmt::Debug for LazyResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyResult")
            .field("empty", &self.is_empty())
            .finish()
    }
}
