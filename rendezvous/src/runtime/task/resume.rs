use super::core::Task;
use super::state::{TaskState, TaskStatus};
use crate::error::Error;
use crate::runtime::executor::Executor;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Moves the awaiting computation onto `executor`.
///
/// Awaiting the returned future enqueues a task whose only job is to
/// resume the awaiting computation, then suspends. It resolves to:
/// - `Ok(())` once the task ran on the executor,
/// - `Err(Error::BrokenTask)` if the executor dropped the task,
/// - the executor's own error if it refused the task.
///
/// # Examples
///
/// ```rust,ignore
/// let result = pool.spawn(async move {
///     resume_on(&*background).await?;
///     // now running on a background thread
///     Ok::<_, Error>(())
/// })?;
/// ```
pub fn resume_on<E>(executor: &E) -> ResumeOn<'_, E>
where
    E: Executor + ?Sized,
{
    ResumeOn {
        executor,
        state: None,
    }
}

/// Future returned by [`resume_on`].
#[must_use = "futures do nothing unless awaited"]
pub struct ResumeOn<'a, E: ?Sized> {
    executor: &'a E,
    state: Option<Arc<TaskState>>,
}

impl<E> Future for ResumeOn<'_, E>
where
    E: Executor + ?Sized,
{
    type Output = Result<(), Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let state = match &self.state {
            Some(state) => {
                state.set_handle(cx.waker());
                state.clone()
            }
            None => {
                let state = Arc::new(TaskState::with_handle(cx.waker().clone()));
                self.state = Some(state.clone());

                if let Err(error) = self.executor.enqueue(Task::new(state.clone())) {
                    return Poll::Ready(Err(error));
                }

                state
            }
        };

        match state.status() {
            TaskStatus::Idle => Poll::Pending,
            TaskStatus::Started => Poll::Ready(Ok(())),
            TaskStatus::Interrupted => Poll::Ready(Err(Error::BrokenTask)),
        }
    }
}
