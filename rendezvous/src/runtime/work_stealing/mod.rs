//! Queues backing the thread-backed executors.
//!
//! - [`injector`]: a global FIFO queue that parks idle workers, also used
//!   on its own by the single worker thread executor,
//! - [`queue`]: per-worker local queues used for fast local execution
//!   and task stealing by the thread pool.

pub(crate) mod injector;
pub(crate) mod queue;
