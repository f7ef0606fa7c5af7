//! # Rendezvous
//!
//! **Rendezvous** is an in-process asynchronous execution engine. It lets
//! computations hand work to executors, wait for each other's outcomes,
//! and compose into structured concurrency patterns, using plain OS
//! threads and Rust futures.
//!
//! It is built from four layers:
//!
//! - **Tasks and executors**: a [`Task`] resumes exactly one suspended
//!   computation when run, and interrupts it when dropped. Executors
//!   ([`ThreadPoolExecutor`], [`ManualExecutor`], ...) decide where and
//!   when tasks run.
//! - **Results**: [`AsyncResult`], [`SharedResult`] and [`LazyResult`]
//!   carry one outcome from a producer to its consumers, which either
//!   block or await.
//! - **Combinators**: [`when_all`], [`when_any`] and [`fork_join`].
//! - **Wait service**: [`wait`] blocks a thread on a 32-bit atomic, with a
//!   native futex where available and a hashed wait table elsewhere.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rendezvous::{ExecutorExt, Runtime, when_all};
//!
//! let runtime = Runtime::new();
//! let pool = runtime.thread_pool_executor();
//!
//! let results = (0..4)
//!     .map(|i| pool.submit(move || i * i))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! let all = when_all(pool.clone(), results)?.get()?;
//! let squares: Vec<i32> = all.into_iter().map(|r| r.get()).collect::<Result<_, _>>()?;
//! assert_eq!(squares, [0, 1, 4, 9]);
//! ```
//!
//! ## Modules
//!
//! - [`executor`]: the executor contract and its variants
//! - [`task`]: tasks, task states and [`resume_on`]
//! - [`result`]: results, promises and channels
//! - [`wait`]: address-based wait/notify

mod error;
mod runtime;
mod utils;
mod when;

pub mod result;
pub mod wait;

pub use error::Error;
pub use result::{AsyncResult, LazyResult, Promise, ResultStatus, SharedResult, channel};
pub use runtime::executor::{
    Executor, ExecutorExt, InlineExecutor, ManualExecutor, ThreadExecutor, ThreadHooks,
    ThreadPoolExecutor, WorkerThreadExecutor,
};
pub use runtime::task::{Task, TaskState, TaskStatus, resume_on};
pub use runtime::{Runtime, RuntimeBuilder, executor, task};
pub use when::{
    ForkJoin, ForkResult, JoinResult, WhenAnyResult, fork_join, when_all, when_any,
};
