//! Structured concurrency combinators.
//!
//! - [`when_all`]: wait for every result of a collection,
//! - [`when_any`]: wait for the first result of a collection to finish,
//! - [`fork_join`]: run branches in parallel and collect their outcomes.
//!
//! `when_all` and `when_any` return lazy results: nothing is awaited
//! until the returned [`LazyResult`](crate::LazyResult) is awaited or run.
//! Both resume the awaiting computation on the executor they are given.

mod all;
mod any;
mod fork_join;

pub use all::when_all;
pub use any::{WhenAnyResult, when_any};
pub use fork_join::{ForkJoin, ForkResult, JoinResult, fork_join};
