use crate::error::Error;
use crate::result::{AsyncResult, LazyResult, ResultStatus};
use crate::runtime::executor::Executor;
use crate::runtime::task::{bind, resume_on};

use futures::task::AtomicWaker;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// One branch of a [`fork_join`]: a computation that has not started yet.
pub struct ForkResult<T> {
    future: Option<BoxedFuture<T>>,
}

impl<T: Send + 'static> ForkResult<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, Error>> + Send + 'static,
    {
        Self {
            future: Some(Box::pin(future)),
        }
    }

    /// Returns `true` if the branch holds no computation.
    pub fn is_empty(&self) -> bool {
        self.future.is_none()
    }

    /// Turns the branch into the root of a computation tree: a lazy
    /// result that runs the branch where it is started and then continues
    /// on `executor`.
    pub fn as_root(self, executor: Arc<dyn Executor>) -> LazyResult<T> {
        let Some(future) = self.future else {
            return LazyResult::new(async { Err(Error::empty("fork_result", "as_root")) });
        };

        LazyResult::new(async move {
            let outcome = future.await;
            resume_on(&*executor).await?;
            outcome
        })
    }
}

impl<T> Default for ForkResult<T> {
    fn default() -> Self {
        Self { future: None }
    }
}

impl<T> fmt::Debug for ForkResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkResult")
            .field("empty", &self.future.is_none())
            .finish()
    }
}

/// The completed outcome of one fork-join branch.
///
/// Reading it never blocks: the join only finishes once every branch has
/// published its outcome.
pub struct JoinResult<T> {
    result: AsyncResult<T>,
}

impl<T> JoinResult<T> {
    /// Whether the branch produced a value or an error.
    pub fn status(&self) -> ResultStatus {
        self.result.status().unwrap_or(ResultStatus::Error)
    }

    /// Moves the branch outcome out.
    pub fn get(self) -> Result<T, Error> {
        self.result.get()
    }
}

impl<T> fmt::Debug for JoinResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinResult")
            .field("status", &self.status())
            .finish()
    }
}

/// Counts branches down and wakes the joiner when the last one arrives.
struct Countdown {
    remaining: AtomicUsize,
    waker: AtomicWaker,
}

impl Countdown {
    fn arrive(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.waker.wake();
        }
    }

    fn is_done(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }
}

/// Runs every branch in parallel and collects their outcomes in order.
///
/// When awaited, all branches but the last are enqueued on `executor`;
/// the last runs inline on the awaiting thread. The awaiting computation
/// resumes from whichever branch finishes last. A branch the executor
/// refuses completes with [`Error::BrokenTask`].
///
/// Fails synchronously with [`Error::InvalidArgument`] on an empty
/// collection and with [`Error::Empty`] on an empty branch.
pub fn fork_join<T>(
    executor: Arc<dyn Executor>,
    branches: Vec<ForkResult<T>>,
) -> Result<ForkJoin<T>, Error>
where
    T: Send + 'static,
{
    if branches.is_empty() {
        return Err(Error::invalid_argument(
            "fork_join",
            "given range contains no elements",
        ));
    }

    if branches.iter().any(|branch| branch.future.is_none()) {
        return Err(Error::empty("fork_result", "fork_join"));
    }

    Ok(ForkJoin {
        executor,
        branches,
        results: Vec::new(),
        countdown: None,
    })
}

/// Future returned by [`fork_join`].
#[must_use = "futures do nothing unless awaited"]
pub struct ForkJoin<T> {
    executor: Arc<dyn Executor>,
    branches: Vec<ForkResult<T>>,
    results: Vec<AsyncResult<T>>,
    countdown: Option<Arc<Countdown>>,
}

impl<T: Send + 'static> ForkJoin<T> {
    fn fork(&mut self, countdown: &Arc<Countdown>) {
        let mut tasks = Vec::with_capacity(self.branches.len());

        for branch in self.branches.drain(..) {
            let Some(future) = branch.future else {
                continue;
            };

            let countdown = countdown.clone();
            let (task, result) = bind(future, move || countdown.arrive());

            tasks.push(task);
            self.results.push(result);
        }

        let last = tasks.pop();

        for task in tasks {
            if let Err(error) = self.executor.enqueue(task) {
                tracing::warn!(%error, "fork-join branch could not be enqueued");
            }
        }

        if let Some(task) = last {
            task.run();
        }
    }
}

impl<T: Send + 'static> Future for ForkJoin<T> {
    type Output = Vec<JoinResult<T>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let countdown = match &self.countdown {
            Some(countdown) => countdown.clone(),
            None => {
                let countdown = Arc::new(Countdown {
                    remaining: AtomicUsize::new(self.branches.len()),
                    waker: AtomicWaker::new(),
                });

                countdown.waker.register(cx.waker());
                self.countdown = Some(countdown.clone());
                self.fork(&countdown);
                countdown
            }
        };

        countdown.waker.register(cx.waker());

        if !countdown.is_done() {
            return Poll::Pending;
        }

        let joined = self
            .results
            .drain(..)
            .map(|result| JoinResult { result })
            .collect();

        Poll::Ready(joined)
    }
}
