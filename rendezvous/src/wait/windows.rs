//! Windows backend: `WaitOnAddress` and `WakeByAddress*`.

use super::AtomicWait;

use std::ffi::c_void;
use std::sync::atomic::AtomicU32;
use std::time::Instant;

use windows_sys::Win32::System::Threading::{
    INFINITE, WaitOnAddress, WakeByAddressAll, WakeByAddressSingle,
};

#[derive(Default, Clone, Copy)]
pub(super) struct AddressWait;

impl AtomicWait for AddressWait {
    fn wait(&self, atom: &AtomicU32, old: u32, deadline: Option<Instant>) {
        let millis = match deadline {
            None => INFINITE,
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                // Round up so a sub-millisecond remainder still blocks.
                let millis = remaining.as_nanos().div_ceil(1_000_000);
                millis.min(u128::from(INFINITE - 1)) as u32
            }
        };

        unsafe {
            WaitOnAddress(
                atom.as_ptr() as *const c_void,
                &old as *const u32 as *const c_void,
                size_of::<u32>(),
                millis,
            );
        }
    }

    fn notify_one(&self, atom: &AtomicU32) {
        unsafe { WakeByAddressSingle(atom.as_ptr() as *const c_void) };
    }

    fn notify_all(&self, atom: &AtomicU32) {
        unsafe { WakeByAddressAll(atom.as_ptr() as *const c_void) };
    }
}
