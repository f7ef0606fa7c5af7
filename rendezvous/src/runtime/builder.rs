use super::Runtime;
use super::executor::ThreadHooks;

use std::thread;

/// Builder for configuring and creating a [`Runtime`].
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .cpu_threads(4)
///     .background_threads(8)
///     .on_thread_start(|name| println!("{name} started"))
///     .build();
/// ```
pub struct RuntimeBuilder {
    /// Workers of the CPU-bound thread pool.
    pub(crate) cpu_threads: usize,

    /// Workers of the background (blocking work) thread pool.
    pub(crate) background_threads: usize,

    pub(crate) hooks: ThreadHooks,
}

impl RuntimeBuilder {
    /// Creates a `RuntimeBuilder` with default configuration.
    ///
    /// The CPU pool gets one worker per available logical CPU (falling
    /// back to `1`), the background pool four times as many.
    pub fn new() -> Self {
        let cpu_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            cpu_threads,
            background_threads: cpu_threads * 4,
            hooks: ThreadHooks::default(),
        }
    }

    /// Sets the number of CPU pool workers.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn cpu_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "cpu_threads must be > 0");

        self.cpu_threads = n;
        self
    }

    /// Sets the number of background pool workers.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn background_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "background_threads must be > 0");

        self.background_threads = n;
        self
    }

    /// Sets a callback invoked, with the thread name, on every thread the
    /// runtime's executors start.
    pub fn on_thread_start(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_start(f);
        self
    }

    /// Sets a callback invoked, with the thread name, when a thread of
    /// the runtime's executors stops.
    pub fn on_thread_stop(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hooks = self.hooks.on_stop(f);
        self
    }

    /// Builds the runtime, starting its thread pools.
    pub fn build(self) -> Runtime {
        Runtime::from_builder(self)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
