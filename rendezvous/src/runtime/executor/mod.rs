//! Executors: places where tasks run.
//!
//! Every executor implements [`Executor`], the minimal object-safe
//! contract (enqueue tasks, report a concurrency level, shut down).
//! [`ExecutorExt`] builds the user-facing operations on top of it for
//! every executor, including `dyn Executor`.
//!
//! Reference variants:
//! - [`InlineExecutor`]: runs tasks on the enqueuing thread,
//! - [`ThreadExecutor`]: one new thread per task,
//! - [`ThreadPoolExecutor`]: fixed work-stealing pool,
//! - [`WorkerThreadExecutor`]: one thread, strict FIFO,
//! - [`ManualExecutor`]: no thread at all; the owner drives it.

mod ext;
mod hooks;
mod inline;
mod manual;
mod thread;
mod thread_pool;
mod worker;
mod worker_thread;

pub use ext::ExecutorExt;
pub use hooks::ThreadHooks;
pub use inline::InlineExecutor;
pub use manual::ManualExecutor;
pub use thread::ThreadExecutor;
pub use thread_pool::ThreadPoolExecutor;
pub use worker_thread::WorkerThreadExecutor;

use crate::error::Error;
use crate::runtime::task::Task;

/// Concurrency level reported by executors that run tasks inline.
pub const INLINE_CONCURRENCY: usize = 0;

/// Concurrency level reported by executors without an upper bound.
pub const UNBOUNDED_CONCURRENCY: usize = usize::MAX;

/// A scheduler of [`Task`]s.
///
/// Implementations must accept tasks concurrently from many threads.
/// A task the executor refuses or discards is simply dropped, which
/// interrupts the computation waiting on it, so nothing is ever leaked.
pub trait Executor: Send + Sync {
    /// Immutable, human-readable name, used in errors and thread names.
    fn name(&self) -> &str;

    /// Schedules `task` to run exactly once.
    ///
    /// Fails with [`Error::RuntimeShutdown`] after shutdown; the task is
    /// dropped in that case.
    fn enqueue(&self, task: Task) -> Result<(), Error>;

    /// Schedules every task, in order.
    ///
    /// Tasks not accepted are dropped.
    fn enqueue_batch(&self, tasks: Vec<Task>) -> Result<(), Error> {
        for task in tasks {
            self.enqueue(task)?;
        }

        Ok(())
    }

    /// How many tasks may run at once: [`INLINE_CONCURRENCY`], `1` for a
    /// serialized worker, the pool size, or [`UNBOUNDED_CONCURRENCY`].
    fn max_concurrency_level(&self) -> usize;

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    fn shutdown_requested(&self) -> bool;

    /// Stops accepting tasks and discards queued ones. Idempotent.
    fn shutdown(&self);
}
