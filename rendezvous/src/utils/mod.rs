//! Small data structures and helpers used internally by the engine.
//!
//! - [`Slab`]: indexed storage with reuse of freed slots, used by the
//!   fallback wait table to hold parked waiters.
//! - [`math`]: prime helpers used to size the wait table.

pub(crate) mod math;
mod slab;

pub(crate) use slab::Slab;
