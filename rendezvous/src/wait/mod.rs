//! Address-based wait/notify.
//!
//! Blocks a thread until a 32-bit atomic changes from an expected value,
//! optionally with a deadline, and wakes one or all threads blocked on the
//! same atomic. Every blocking consumer in the crate parks through here.
//!
//! The backend is selected at compile time:
//! - Linux uses the `futex` system call directly,
//! - Windows uses `WaitOnAddress` / `WakeByAddress*`,
//! - every other target falls back to a process-wide [`WaitTable`].
//!
//! Spurious wake-ups are absorbed here: the public functions only return
//! once the value differs from `old` or the deadline has passed.

#[cfg(target_os = "linux")]
mod futex;

#[cfg(windows)]
mod windows;

mod table;

pub use table::WaitTable;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Outcome of a timed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// The value changed, or the waiter was notified.
    Notified,
    /// The deadline passed while the value still equalled `old`.
    TimedOut,
}

/// A blocking backend for the wait service.
///
/// Implementations may return spuriously; callers re-check the value.
pub trait AtomicWait: Send + Sync {
    /// Blocks while `atom == old`, until notified or until `deadline`.
    fn wait(&self, atom: &AtomicU32, old: u32, deadline: Option<Instant>);

    /// Wakes at most one thread blocked on `atom`.
    fn notify_one(&self, atom: &AtomicU32);

    /// Wakes every thread blocked on `atom`.
    fn notify_all(&self, atom: &AtomicU32);
}

#[cfg(target_os = "linux")]
type Backend = futex::Futex;

#[cfg(windows)]
type Backend = windows::AddressWait;

#[cfg(not(any(target_os = "linux", windows)))]
type Backend = &'static WaitTable;

#[cfg(any(target_os = "linux", windows))]
fn backend() -> Backend {
    Backend::default()
}

#[cfg(not(any(target_os = "linux", windows)))]
fn backend() -> Backend {
    WaitTable::global()
}

/// Blocks the current thread until `atom` no longer holds `old`.
pub fn wait(atom: &AtomicU32, old: u32) {
    while atom.load(Ordering::Acquire) == old {
        backend().wait(atom, old, None);
    }
}

/// Blocks until `atom` no longer holds `old`, or `timeout` elapses.
pub fn wait_for(atom: &AtomicU32, old: u32, timeout: Duration) -> WaitStatus {
    match Instant::now().checked_add(timeout) {
        Some(deadline) => wait_until(atom, old, deadline),
        None => {
            wait(atom, old);
            WaitStatus::Notified
        }
    }
}

/// Blocks until `atom` no longer holds `old`, or `deadline` is reached.
pub fn wait_until(atom: &AtomicU32, old: u32, deadline: Instant) -> WaitStatus {
    loop {
        if atom.load(Ordering::Acquire) != old {
            return WaitStatus::Notified;
        }

        if Instant::now() >= deadline {
            return WaitStatus::TimedOut;
        }

        backend().wait(atom, old, Some(deadline));
    }
}

/// Wakes at most one thread blocked on `atom`.
pub fn notify_one(atom: &AtomicU32) {
    backend().notify_one(atom);
}

/// Wakes every thread blocked on `atom`.
pub fn notify_all(atom: &AtomicU32) {
    backend().notify_all(atom);
}

impl<W: AtomicWait + ?Sized> AtomicWait for &W {
    fn wait(&self, atom: &AtomicU32, old: u32, deadline: Option<Instant>) {
        (**self).wait(atom, old, deadline)
    }

    fn notify_one(&self, atom: &AtomicU32) {
        (**self).notify_one(atom)
    }

    fn notify_all(&self, atom: &AtomicU32) {
        (**self).notify_all(atom)
    }
}
