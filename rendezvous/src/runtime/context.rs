use std::cell::Cell;

thread_local! {
    /// Identity of the pool worker running on this thread, if any:
    /// `(pool id, worker index)`.
    ///
    /// Lets a pool push work spawned from one of its own workers onto
    /// that worker's local queue instead of the global injector.
    static CURRENT_WORKER: Cell<Option<(usize, usize)>> = const { Cell::new(None) };
}

/// Runs `f` with the current thread registered as worker `index` of pool `pool`.
///
/// The previous registration is restored afterwards.
pub(crate) fn enter_worker<R>(pool: usize, index: usize, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_WORKER.with(|cell| cell.replace(Some((pool, index))));
    let out = f();
    CURRENT_WORKER.with(|cell| cell.set(previous));
    out
}

/// Returns the worker index of the current thread within `pool`.
pub(crate) fn current_worker(pool: usize) -> Option<usize> {
    CURRENT_WORKER.with(|cell| match cell.get() {
        Some((id, index)) if id == pool => Some(index),
        _ => None,
    })
}
