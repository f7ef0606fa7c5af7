//! Error type shared by every fallible operation of the crate.

use std::any::Any;
use std::sync::Arc;

/// Errors surfaced by executors, results and combinators.
///
/// `Error` is cheap to clone so that a shared result can hand the same
/// stored failure to every consumer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An operation was attempted on an empty (default-constructed or
    /// already consumed) handle.
    #[error("{class}::{method}() - {class} is empty.")]
    Empty {
        class: &'static str,
        method: &'static str,
    },

    /// The computation that should have produced a value was interrupted
    /// before it could run, typically because its task was dropped.
    #[error("associated task was interrupted abnormally")]
    BrokenTask,

    /// A caller passed an argument the operation cannot accept.
    #[error("{method}() - {reason}")]
    InvalidArgument {
        method: &'static str,
        reason: &'static str,
    },

    /// The executor refused work because it has already been shut down.
    #[error("{executor}::{method}() - {executor} has already been shut down.")]
    RuntimeShutdown {
        executor: String,
        method: &'static str,
    },

    /// An executor could not start one of its threads.
    #[error("{executor} - failed to spawn a thread: {source}")]
    ThreadSpawn {
        executor: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A user callable panicked; the payload message is preserved.
    #[error("task panicked: {message}")]
    Panicked { message: String },

    /// An error reported by a producer through its promise.
    #[error(transparent)]
    User(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn empty(class: &'static str, method: &'static str) -> Self {
        Self::Empty { class, method }
    }

    pub(crate) fn shutdown(executor: &str, method: &'static str) -> Self {
        Self::RuntimeShutdown {
            executor: executor.to_owned(),
            method,
        }
    }

    pub(crate) fn invalid_argument(method: &'static str, reason: &'static str) -> Self {
        Self::InvalidArgument { method, reason }
    }

    /// Wraps any error value as a user error.
    pub fn user<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::User(Arc::new(error))
    }

    /// Converts a panic payload into [`Error::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_owned()
        };

        Self::Panicked { message }
    }

    /// Returns `true` for [`Error::BrokenTask`].
    pub fn is_broken_task(&self) -> bool {
        matches!(self, Self::BrokenTask)
    }

    /// Returns `true` for [`Error::RuntimeShutdown`].
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::RuntimeShutdown { .. })
    }
}
