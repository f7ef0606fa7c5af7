//! Tasks and the continuation contract.
//!
//! A [`Task`] is the unit executors schedule: a move-only handle that
//! either resumes one suspended computation (when run) or interrupts it
//! (when dropped). The shared [`TaskState`] records which of the two
//! happened, and the computation checks it at its resume point.
//!
//! Internally, computations started by the engine are driven by
//! routines: futures polled inline by whichever thread wakes them.

mod core;
mod resume;
mod routine;
mod state;
mod waker;

pub use self::core::Task;
pub use resume::{ResumeOn, resume_on};
pub use state::{TaskState, TaskStatus};

pub(crate) use routine::{bind, start};
