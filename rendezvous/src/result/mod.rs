//! Producer/consumer synchronization for asynchronous outcomes.
//!
//! Every asynchronous computation publishes exactly one outcome (a value
//! or an [`Error`]) into a result state. Consumers either block on it
//! through the wait service, or register a continuation by awaiting it.
//!
//! - [`AsyncResult`]: exclusive consumer, outcome moved out once.
//! - [`SharedResult`]: many consumers, outcome borrowed.
//! - [`LazyResult`]: computation that starts when awaited or run.
//! - [`Promise`]: the producing side, created by [`channel`].

mod core;
mod lazy;
mod promise;
mod shared;
pub(crate) mod state;

pub use self::core::{AsyncResult, Await, Resolve};
pub use lazy::LazyResult;
pub use promise::{Promise, channel};
pub use shared::{SharedAwait, SharedResult};

use state::ResultState;

/// Observable state of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// No outcome yet.
    Idle,
    /// Completed with a value.
    Value,
    /// Completed with an error.
    Error,
}

impl ResultStatus {
    fn of<T>(state: &ResultState<T>) -> Self {
        match state.outcome() {
            None => ResultStatus::Idle,
            Some(Ok(_)) => ResultStatus::Value,
            Some(Err(_)) => ResultStatus::Error,
        }
    }
}
