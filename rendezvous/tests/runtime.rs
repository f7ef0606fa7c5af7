use rendezvous::{Executor, ExecutorExt, Runtime, RuntimeBuilder};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn test_block_on() {
    let runtime = Runtime::new();

    let value = runtime
        .block_on(async {
            let name = thread::current().name().map(str::to_owned);
            (21 * 2, name)
        })
        .unwrap();

    assert_eq!(value.0, 42);
    assert_eq!(value.1.as_deref(), Some("thread_pool_executor worker"));
}

#[test]
fn test_executor_names() {
    let runtime = Runtime::new();

    assert_eq!(runtime.inline_executor().name(), "inline_executor");
    assert_eq!(runtime.thread_pool_executor().name(), "thread_pool_executor");
    assert_eq!(runtime.background_executor().name(), "background_executor");
    assert_eq!(runtime.thread_executor().name(), "thread_executor");
    assert_eq!(
        runtime.make_worker_thread_executor().name(),
        "worker_thread_executor"
    );
    assert_eq!(runtime.make_manual_executor().name(), "manual_executor");
}

#[test]
fn test_builder_sizes_pools() {
    let runtime = RuntimeBuilder::new()
        .cpu_threads(3)
        .background_threads(5)
        .build();

    assert_eq!(runtime.thread_pool_executor().max_concurrency_level(), 3);
    assert_eq!(runtime.background_executor().max_concurrency_level(), 5);
}

#[test]
fn test_thread_hooks_run_for_every_thread() {
    let started = Arc::new(AtomicUsize::new(0));
    let stopped = Arc::new(AtomicUsize::new(0));

    let runtime = RuntimeBuilder::new()
        .cpu_threads(2)
        .background_threads(1)
        .on_thread_start({
            let started = started.clone();
            move |_| {
                started.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_thread_stop({
            let stopped = stopped.clone();
            move |_| {
                stopped.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    runtime
        .thread_executor()
        .submit(|| ())
        .unwrap()
        .get()
        .unwrap();

    drop(runtime);

    assert_eq!(started.load(Ordering::SeqCst), 4);
    assert_eq!(stopped.load(Ordering::SeqCst), 4);
}

#[test]
fn test_drop_shuts_down_every_executor() {
    let runtime = Runtime::new();

    let pool = runtime.thread_pool_executor();
    let manual = runtime.make_manual_executor();
    let worker = runtime.make_worker_thread_executor();

    let pending = manual.submit(|| 1).unwrap();

    drop(runtime);

    assert!(pool.shutdown_requested());
    assert!(manual.shutdown_requested());
    assert!(worker.shutdown_requested());

    assert!(pending.get().unwrap_err().is_broken_task());
    assert!(pool.post(|| ()).unwrap_err().is_shutdown());
}
