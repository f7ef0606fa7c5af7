use super::Executor;
use crate::error::Error;
use crate::result::AsyncResult;
use crate::runtime::task::bind;

/// User-facing operations available on every [`Executor`].
///
/// Each operation checks [`Executor::shutdown_requested`] before doing
/// anything and fails fast with [`Error::RuntimeShutdown`]. Panics in the
/// submitted work are captured and surface through the returned result
/// as [`Error::Panicked`].
pub trait ExecutorExt: Executor {
    /// Runs `callable` on this executor, discarding its outcome.
    fn post<F>(&self, callable: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        ensure_running(self, "post")?;

        let (task, _) = bind(async move { Ok(callable()) }, || {});
        self.enqueue(task)
    }

    /// Runs `callable` on this executor and returns a result for its value.
    fn submit<F, T>(&self, callable: F) -> Result<AsyncResult<T>, Error>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        ensure_running(self, "submit")?;

        let (task, result) = bind(async move { Ok(callable()) }, || {});
        self.enqueue(task)?;

        Ok(result)
    }

    /// Starts `future` on this executor.
    ///
    /// The future is first polled by the executor; after each suspension
    /// it continues on whichever thread resumes it.
    fn spawn<F>(&self, future: F) -> Result<AsyncResult<F::Output>, Error>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        ensure_running(self, "spawn")?;

        let (task, result) = bind(async move { Ok(future.await) }, || {});
        self.enqueue(task)?;

        Ok(result)
    }

    /// Posts every callable at once through [`Executor::enqueue_batch`].
    fn bulk_post<F>(&self, callables: Vec<F>) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        ensure_running(self, "bulk_post")?;

        let tasks = callables
            .into_iter()
            .map(|callable| bind(async move { Ok(callable()) }, || {}).0)
            .collect();

        self.enqueue_batch(tasks)
    }

    /// Submits every callable at once through [`Executor::enqueue_batch`].
    fn bulk_submit<F, T>(&self, callables: Vec<F>) -> Result<Vec<AsyncResult<T>>, Error>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        ensure_running(self, "bulk_submit")?;

        let (tasks, results): (Vec<_>, Vec<_>) = callables
            .into_iter()
            .map(|callable| bind(async move { Ok(callable()) }, || {}))
            .unzip();

        self.enqueue_batch(tasks)?;

        Ok(results)
    }
}

impl<E: Executor + ?Sized> ExecutorExt for E {}

fn ensure_running<E: Executor + ?Sized>(executor: &E, method: &'static str) -> Result<(), Error> {
    if executor.shutdown_requested() {
        return Err(Error::shutdown(executor.name(), method));
    }

    Ok(())
}
