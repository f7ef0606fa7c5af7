use super::{Executor, INLINE_CONCURRENCY};
use crate::error::Error;
use crate::runtime::task::Task;

use std::sync::atomic::{AtomicBool, Ordering};

/// Runs every task synchronously on the enqueuing thread.
#[derive(Debug, Default)]
pub struct InlineExecutor {
    shutdown: AtomicBool,
}

impl InlineExecutor {
    pub const NAME: &'static str = "inline_executor";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for InlineExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn enqueue(&self, task: Task) -> Result<(), Error> {
        if self.shutdown_requested() {
            return Err(Error::shutdown(Self::NAME, "enqueue"));
        }

        task.run();
        Ok(())
    }

    fn max_concurrency_level(&self) -> usize {
        INLINE_CONCURRENCY
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}
