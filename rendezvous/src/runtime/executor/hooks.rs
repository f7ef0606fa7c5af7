use crate::error::Error;

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Hook = Arc<dyn Fn(&str) + Send + Sync>;

/// Callbacks invoked on every thread an executor starts.
///
/// Both receive the thread name (`"{executor} worker"`). `on_start` runs
/// before the thread picks up any task, `on_stop` after it ran its last.
#[derive(Clone, Default)]
pub struct ThreadHooks {
    on_start: Option<Hook>,
    on_stop: Option<Hook>,
}

impl ThreadHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback invoked when a thread starts.
    pub fn on_start(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    /// Sets the callback invoked when a thread stops.
    pub fn on_stop(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stop = Some(Arc::new(f));
        self
    }

    /// Spawns a named executor thread running `body` between the hooks.
    pub(crate) fn spawn<F>(&self, executor: &str, body: F) -> Result<JoinHandle<()>, Error>
    where
        F: FnOnce() + Send + 'static,
    {
        let name = format!("{executor} worker");
        let hooks = self.clone();

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                tracing::trace!(thread = %name, "executor thread started");

                if let Some(on_start) = &hooks.on_start {
                    on_start(&name);
                }

                body();

                if let Some(on_stop) = &hooks.on_stop {
                    on_stop(&name);
                }

                tracing::trace!(thread = %name, "executor thread stopped");
            })
            .map_err(|source| Error::ThreadSpawn {
                executor: executor.to_owned(),
                source: Arc::new(source),
            })
    }
}

impl fmt::Debug for ThreadHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .finish()
    }
}

/// Joins every handle except the calling thread's own.
pub(crate) fn join_all(handles: Vec<JoinHandle<()>>) {
    let current = thread::current().id();

    for handle in handles {
        if handle.thread().id() != current {
            let _ = handle.join();
        }
    }
}
