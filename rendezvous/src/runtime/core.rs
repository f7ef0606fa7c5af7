use super::builder::RuntimeBuilder;
use super::executor::{
    Executor, ExecutorExt, InlineExecutor, ManualExecutor, ThreadExecutor, ThreadHooks,
    ThreadPoolExecutor, WorkerThreadExecutor,
};
use crate::error::Error;

use std::sync::{Arc, Mutex, PoisonError};

/// Owner of the process-wide executors.
///
/// A `Runtime` provides:
/// - an inline executor,
/// - a CPU-bound thread pool (`thread_pool_executor`),
/// - a background thread pool for blocking work (`background_executor`),
/// - a thread-per-task executor,
/// - factories for worker-thread and manual executors.
///
/// Dropping the runtime shuts every one of them down, including the
/// executors created through the factories. Tasks still queued at that
/// point are dropped and their computations interrupted.
pub struct Runtime {
    inline: Arc<InlineExecutor>,
    thread_pool: Arc<ThreadPoolExecutor>,
    background: Arc<ThreadPoolExecutor>,
    thread: Arc<ThreadExecutor>,
    hooks: ThreadHooks,

    /// Executors created on demand, shut down with the runtime.
    created: Mutex<Vec<Arc<dyn Executor>>>,
}

impl Runtime {
    pub const BACKGROUND_NAME: &'static str = "background_executor";

    /// Creates a runtime with the default configuration.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub(crate) fn from_builder(builder: RuntimeBuilder) -> Self {
        let hooks = builder.hooks;

        Self {
            inline: Arc::new(InlineExecutor::new()),
            thread_pool: Arc::new(ThreadPoolExecutor::new(
                ThreadPoolExecutor::NAME,
                builder.cpu_threads,
                hooks.clone(),
            )),
            background: Arc::new(ThreadPoolExecutor::new(
                Self::BACKGROUND_NAME,
                builder.background_threads,
                hooks.clone(),
            )),
            thread: Arc::new(ThreadExecutor::new(hooks.clone())),
            hooks,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn inline_executor(&self) -> Arc<InlineExecutor> {
        self.inline.clone()
    }

    pub fn thread_pool_executor(&self) -> Arc<ThreadPoolExecutor> {
        self.thread_pool.clone()
    }

    pub fn background_executor(&self) -> Arc<ThreadPoolExecutor> {
        self.background.clone()
    }

    pub fn thread_executor(&self) -> Arc<ThreadExecutor> {
        self.thread.clone()
    }

    /// Creates a new single-thread executor owned by this runtime.
    pub fn make_worker_thread_executor(&self) -> Arc<WorkerThreadExecutor> {
        let executor = Arc::new(WorkerThreadExecutor::new(self.hooks.clone()));
        self.register(executor.clone());
        executor
    }

    /// Creates a new manual executor owned by this runtime.
    pub fn make_manual_executor(&self) -> Arc<ManualExecutor> {
        let executor = Arc::new(ManualExecutor::new());
        self.register(executor.clone());
        executor
    }

    fn register(&self, executor: Arc<dyn Executor>) {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(executor);
    }

    /// Runs a future on the CPU pool and blocks the current thread until
    /// it completes.
    ///
    /// Must not be called from one of the runtime's own pool workers.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let runtime = Runtime::new();
    /// assert_eq!(runtime.block_on(async { 42 })?, 42);
    /// ```
    pub fn block_on<F>(&self, future: F) -> Result<F::Output, Error>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.thread_pool.spawn(future)?.get()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    /// Shuts down every executor: the ones created on demand first, then
    /// the thread executor, the background pool, the CPU pool and finally
    /// the inline executor.
    fn drop(&mut self) {
        let created = std::mem::take(
            &mut *self.created.lock().unwrap_or_else(PoisonError::into_inner),
        );

        for executor in created {
            executor.shutdown();
        }

        self.thread.shutdown();
        self.background.shutdown();
        self.thread_pool.shutdown();
        self.inline.shutdown();
    }
}
