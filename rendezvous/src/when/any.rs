use crate::error::Error;
use crate::result::state::Continuation;
use crate::result::{AsyncResult, LazyResult};
use crate::runtime::executor::Executor;
use crate::runtime::task::resume_on;

use futures::task::AtomicWaker;

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

/// No member has claimed the race yet.
const NO_WINNER: usize = usize::MAX;

/// Outcome of [`when_any`]: the index of the first completed result and
/// every result, in their original order.
#[derive(Debug)]
pub struct WhenAnyResult<C> {
    pub index: usize,
    pub results: C,
}

/// Waits until at least one result in `results` has completed.
///
/// Results are examined in order; a result that is already complete when
/// examined wins immediately, so among several ready results the leftmost
/// one wins. Otherwise the first producer to complete wins. Once a winner
/// is known the awaiting computation continues on `executor`.
///
/// Fails synchronously with [`Error::InvalidArgument`] if `results` is
/// empty or contains an empty result.
pub fn when_any<T>(
    executor: Arc<dyn Executor>,
    results: Vec<AsyncResult<T>>,
) -> Result<LazyResult<WhenAnyResult<Vec<AsyncResult<T>>>>, Error>
where
    T: Send + 'static,
{
    if results.is_empty() {
        return Err(Error::invalid_argument(
            "when_any",
            "given range contains no elements",
        ));
    }

    if results.iter().any(AsyncResult::is_empty) {
        return Err(Error::invalid_argument(
            "when_any",
            "one of the results is empty",
        ));
    }

    Ok(LazyResult::new(async move {
        let index = Race::new(&results).await;

        resume_on(&*executor).await?;
        Ok(WhenAnyResult { index, results })
    }))
}

/// Shared record of which member completed first.
struct RaceContext {
    winner: AtomicUsize,
    waker: AtomicWaker,
}

impl RaceContext {
    /// Claims the race for `index`. Only the first claim succeeds.
    fn claim(&self, index: usize) -> bool {
        self.winner
            .compare_exchange(NO_WINNER, index, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Continuation registered on one member of the race.
struct RaceMember {
    context: Arc<RaceContext>,
    index: usize,
}

impl Wake for RaceMember {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if self.context.claim(self.index) {
            self.context.waker.wake();
        }
    }
}

/// Resolves to the index of the winning member.
///
/// Every registration is withdrawn once the race is decided, or when the
/// future is dropped.
struct Race<'a, T> {
    results: &'a [AsyncResult<T>],
    context: Option<Arc<RaceContext>>,

    /// Number of leading members that may hold a registration.
    registered: usize,
}

impl<'a, T> Race<'a, T> {
    fn new(results: &'a [AsyncResult<T>]) -> Self {
        Self {
            results,
            context: None,
            registered: 0,
        }
    }

    fn start(&mut self, context: &Arc<RaceContext>) {
        for (index, result) in self.results.iter().enumerate() {
            let Some(state) = result.inner() else {
                continue;
            };

            if state.is_done() {
                context.claim(index);
                return;
            }

            let member = Waker::from(Arc::new(RaceMember {
                context: context.clone(),
                index,
            }));

            self.registered = index + 1;

            if state.register(Continuation::Inline(member)).is_err() {
                context.claim(index);
                return;
            }
        }
    }

    fn rewind(&mut self) {
        for result in &self.results[..self.registered] {
            if let Some(state) = result.inner() {
                state.rewind();
            }
        }

        self.registered = 0;
    }
}

impl<T> Future for Race<'_, T> {
    type Output = usize;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<usize> {
        let context = match &self.context {
            Some(context) => context.clone(),
            None => {
                let context = Arc::new(RaceContext {
                    winner: AtomicUsize::new(NO_WINNER),
                    waker: AtomicWaker::new(),
                });

                self.context = Some(context.clone());
                context.waker.register(cx.waker());
                self.start(&context);
                context
            }
        };

        context.waker.register(cx.waker());

        match context.winner.load(Ordering::Acquire) {
            NO_WINNER => Poll::Pending,
            winner => {
                self.rewind();
                Poll::Ready(winner)
            }
        }
    }
}

impl<T> Drop for Race<'_, T> {
    fn drop(&mut self) {
        self.rewind();
    }
}
