//! Linux backend: private futexes on the atomic's address.

use super::AtomicWait;

use std::ptr;
use std::sync::atomic::AtomicU32;
use std::time::Instant;

#[derive(Default, Clone, Copy)]
pub(super) struct Futex;

impl Futex {
    fn wake(atom: &AtomicU32, count: i32) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                atom.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                count,
            );
        }
    }
}

impl AtomicWait for Futex {
    fn wait(&self, atom: &AtomicU32, old: u32, deadline: Option<Instant>) {
        let timeout = deadline.map(|deadline| {
            let remaining = deadline.saturating_duration_since(Instant::now());

            libc::timespec {
                tv_sec: remaining.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
                tv_nsec: remaining.subsec_nanos() as libc::c_long,
            }
        });

        let timeout_ptr = timeout
            .as_ref()
            .map_or(ptr::null(), |ts| ts as *const libc::timespec);

        // EAGAIN (value already changed), EINTR and ETIMEDOUT all mean
        // "re-check the value", which the caller does.
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                atom.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                old,
                timeout_ptr,
            );
        }
    }

    fn notify_one(&self, atom: &AtomicU32) {
        Self::wake(atom, 1);
    }

    fn notify_all(&self, atom: &AtomicU32) {
        Self::wake(atom, i32::MAX);
    }
}
