use super::routine::Routine;

use std::mem;
use std::sync::Arc;
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Vtable shared by every routine waker.
///
/// The data pointer always originates from `Arc::into_raw` on an
/// `Arc<Routine>`, and each function keeps the strong count balanced.
static VTABLE: RawWakerVTable = RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw);

/// Creates a [`Waker`] that resumes `routine` on the waking thread.
pub(crate) fn make_waker(routine: Arc<Routine>) -> Waker {
    unsafe { Waker::from_raw(RawWaker::new(Arc::into_raw(routine) as *const (), &VTABLE)) }
}

fn clone_raw(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::from_raw(ptr as *const Routine) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), &VTABLE)
}

fn wake_raw(ptr: *const ()) {
    let arc = unsafe { Arc::from_raw(ptr as *const Routine) };
    arc.resume();
}

fn wake_by_ref_raw(ptr: *const ()) {
    let arc = unsafe { Arc::from_raw(ptr as *const Routine) };
    arc.resume();
    mem::forget(arc);
}

fn drop_raw(ptr: *const ()) {
    unsafe { drop(Arc::from_raw(ptr as *const Routine)) };
}
