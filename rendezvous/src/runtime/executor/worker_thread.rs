use super::Executor;
use super::hooks::{ThreadHooks, join_all};
use crate::error::Error;
use crate::runtime::task::Task;
use crate::runtime::work_stealing::injector::Injector;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// A single dedicated thread running tasks one at a time, in FIFO order.
pub struct WorkerThreadExecutor {
    queue: Arc<Injector>,
    handle: Mutex<Option<JoinHandle<()>>>,
    shutdown: AtomicBool,
}

impl WorkerThreadExecutor {
    pub const NAME: &'static str = "worker_thread_executor";

    /// Starts the worker thread.
    ///
    /// # Panics
    ///
    /// Panics if the thread cannot be spawned.
    pub fn new(hooks: ThreadHooks) -> Self {
        let queue = Arc::new(Injector::new());

        let handle = {
            let queue = queue.clone();
            hooks
                .spawn(Self::NAME, move || {
                    while let Some(task) = queue.pop() {
                        task.run();
                    }
                })
                .unwrap_or_else(|error| panic!("{error}"))
        };

        Self {
            queue,
            handle: Mutex::new(Some(handle)),
            shutdown: AtomicBool::new(false),
        }
    }
}

impl Default for WorkerThreadExecutor {
    fn default() -> Self {
        Self::new(ThreadHooks::default())
    }
}

impl Executor for WorkerThreadExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn enqueue(&self, task: Task) -> Result<(), Error> {
        self.queue
            .push(task)
            .map_err(|_| Error::shutdown(Self::NAME, "enqueue"))
    }

    fn enqueue_batch(&self, tasks: Vec<Task>) -> Result<(), Error> {
        self.queue
            .push_batch(tasks)
            .map_err(|_| Error::shutdown(Self::NAME, "enqueue_batch"))
    }

    fn max_concurrency_level(&self) -> usize {
        1
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        let dropped = self.queue.shutdown();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        join_all(handle.into_iter().collect());

        tracing::debug!(executor = Self::NAME, dropped = dropped.len(), "shut down");
        drop(dropped);
    }
}

impl Drop for WorkerThreadExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
