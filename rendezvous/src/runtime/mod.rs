//! Core runtime components.
//!
//! This module contains the execution side of the engine:
//! - [`task`]: tasks and the continuation contract,
//! - [`executor`]: the executor contract and its reference variants,
//! - the work-stealing queues behind the thread-backed executors,
//! - [`Runtime`] and its [`RuntimeBuilder`].

mod core;
mod work_stealing;

pub(crate) mod builder;
pub(crate) mod context;

pub mod executor;
pub mod task;

pub use self::core::Runtime;
pub use builder::RuntimeBuilder;
