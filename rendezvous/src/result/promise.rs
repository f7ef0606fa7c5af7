use super::core::AsyncResult;
use super::state::ResultState;
use crate::error::Error;

use std::sync::Arc;

/// Creates a connected producer/consumer pair.
///
/// # Examples
///
/// ```rust,ignore
/// let (promise, result) = rendezvous::result::channel();
/// thread::spawn(move || promise.set_value(42));
/// assert_eq!(result.get()?, 42);
/// ```
pub fn channel<T>() -> (Promise<T>, AsyncResult<T>) {
    let state = Arc::new(ResultState::new());

    (
        Promise {
            state: Some(state.clone()),
        },
        AsyncResult::from_state(state),
    )
}

/// The producing side of an [`AsyncResult`].
///
/// A promise completes its result exactly once. Dropping it without
/// completing completes the result with [`Error::BrokenTask`].
pub struct Promise<T> {
    state: Option<Arc<ResultState<T>>>,
}

impl<T> Promise<T> {
    /// Completes the result with a value.
    pub fn set_value(self, value: T) {
        self.complete(Ok(value));
    }

    /// Completes the result with an error.
    pub fn set_error(self, error: Error) {
        self.complete(Err(error));
    }

    pub(crate) fn complete(mut self, outcome: Result<T, Error>) {
        if let Some(state) = self.state.take() {
            state.complete(outcome);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.complete(Err(Error::BrokenTask));
        }
    }
}
