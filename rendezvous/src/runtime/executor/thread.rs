use super::hooks::{ThreadHooks, join_all};
use super::{Executor, UNBOUNDED_CONCURRENCY};
use crate::error::Error;
use crate::runtime::task::Task;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

struct Threads {
    handles: Vec<JoinHandle<()>>,
    shutdown: bool,
}

/// Starts a dedicated thread for every task.
///
/// Suited to long-running or blocking work that should not occupy a
/// pool worker. Shutdown waits for every started thread to finish.
pub struct ThreadExecutor {
    hooks: ThreadHooks,
    threads: Mutex<Threads>,
    shutdown: AtomicBool,
}

impl ThreadExecutor {
    pub const NAME: &'static str = "thread_executor";

    pub fn new(hooks: ThreadHooks) -> Self {
        Self {
            hooks,
            threads: Mutex::new(Threads {
                handles: Vec::new(),
                shutdown: false,
            }),
            shutdown: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Threads> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new(ThreadHooks::default())
    }
}

impl Executor for ThreadExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn enqueue(&self, task: Task) -> Result<(), Error> {
        let mut threads = self.lock();
        if threads.shutdown {
            return Err(Error::shutdown(Self::NAME, "enqueue"));
        }

        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut threads.handles)
            .into_iter()
            .partition(|handle| handle.is_finished());
        threads.handles = running;
        drop(threads);

        join_all(finished);

        // Spawned outside the lock: if spawning fails, the task is dropped
        // with the closure and its computation is interrupted.
        let handle = self.hooks.spawn(Self::NAME, move || task.run())?;

        let mut threads = self.lock();
        if threads.shutdown {
            // Shutdown already collected the other handles.
            drop(threads);
            join_all(vec![handle]);
        } else {
            threads.handles.push(handle);
        }

        Ok(())
    }

    fn max_concurrency_level(&self) -> usize {
        UNBOUNDED_CONCURRENCY
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        let mut threads = self.lock();
        if threads.shutdown {
            return;
        }

        threads.shutdown = true;
        self.shutdown.store(true, Ordering::Release);
        let handles = std::mem::take(&mut threads.handles);
        drop(threads);

        tracing::debug!(executor = Self::NAME, threads = handles.len(), "shutting down");
        join_all(handles);
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
