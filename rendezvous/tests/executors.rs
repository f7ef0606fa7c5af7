use rendezvous::executor::{INLINE_CONCURRENCY, UNBOUNDED_CONCURRENCY};
use rendezvous::{
    Error, Executor, ExecutorExt, InlineExecutor, ThreadExecutor, ThreadHooks,
    ThreadPoolExecutor, WorkerThreadExecutor,
};

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

#[test]
fn test_inline_executor_runs_on_caller() {
    let executor = InlineExecutor::new();

    let result = executor.submit(|| thread::current().id()).unwrap();

    assert_eq!(result.get().unwrap(), thread::current().id());
    assert_eq!(executor.name(), "inline_executor");
    assert_eq!(executor.max_concurrency_level(), INLINE_CONCURRENCY);
}

#[test]
fn test_submit_after_shutdown_fails() {
    let executors: Vec<Arc<dyn Executor>> = vec![
        Arc::new(InlineExecutor::new()),
        Arc::new(ThreadExecutor::default()),
        Arc::new(ThreadPoolExecutor::new("pool", 2, ThreadHooks::default())),
        Arc::new(WorkerThreadExecutor::default()),
    ];

    for executor in executors {
        executor.shutdown();
        executor.shutdown();
        assert!(executor.shutdown_requested());

        let error = executor.submit(|| 1).unwrap_err();
        assert!(error.is_shutdown(), "{error}");

        let error = executor.post(|| {}).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!(
                "{name}::post() - {name} has already been shut down.",
                name = executor.name()
            )
        );
    }
}

#[test]
fn test_panics_are_captured() {
    let executor = ThreadPoolExecutor::new("pool", 2, ThreadHooks::default());

    let result = executor.submit(|| -> i32 { panic!("boom") }).unwrap();

    match result.get() {
        Err(Error::Panicked { message }) => assert_eq!(message, "boom"),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // The pool survives the panic.
    assert_eq!(executor.submit(|| 7).unwrap().get().unwrap(), 7);
}

#[test]
fn test_thread_executor_uses_a_thread_per_task() {
    let executor = ThreadExecutor::default();

    let results: Vec<_> = (0..8)
        .map(|_| {
            executor
                .submit(|| {
                    thread::sleep(Duration::from_millis(20));
                    (thread::current().id(), thread::current().name().map(str::to_owned))
                })
                .unwrap()
        })
        .collect();

    let mut ids = HashSet::new();
    for result in results {
        let (id, name) = result.get().unwrap();
        assert_eq!(name.as_deref(), Some("thread_executor worker"));
        ids.insert(id);
    }

    assert_eq!(ids.len(), 8);
    assert_eq!(executor.max_concurrency_level(), UNBOUNDED_CONCURRENCY);
}

#[test]
fn test_thread_pool_runs_everything() {
    let _trace = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_ids(true)
        .set_default();

    let executor = ThreadPoolExecutor::new("pool", 4, ThreadHooks::default());
    assert_eq!(executor.max_concurrency_level(), 4);

    let results: Vec<_> = (0..100)
        .map(|i| executor.submit(move || i * 2).unwrap())
        .collect();

    let sum: i32 = results.into_iter().map(|r| r.get().unwrap()).sum();
    assert_eq!(sum, (0..100).map(|i| i * 2).sum());
}

#[test]
fn test_thread_pool_nested_spawns_run() {
    let executor = Arc::new(ThreadPoolExecutor::new("pool", 3, ThreadHooks::default()));
    let counter = Arc::new(AtomicUsize::new(0));

    let outer = {
        let executor = executor.clone();
        let counter = counter.clone();
        executor
            .clone()
            .spawn(async move {
                let inner: Vec<_> = (0..20)
                    .map(|_| {
                        let counter = counter.clone();
                        executor
                            .submit(move || counter.fetch_add(1, Ordering::SeqCst))
                            .unwrap()
                    })
                    .collect();

                for result in inner {
                    result.await.unwrap();
                }
            })
            .unwrap()
    };

    outer.get().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 20);
}

#[test]
fn test_thread_pool_shutdown_interrupts_queued_tasks() {
    let executor = Arc::new(ThreadPoolExecutor::new("pool", 1, ThreadHooks::default()));
    let (release, blocked) = mpsc::channel::<()>();
    let (started, running) = mpsc::channel::<()>();

    let blocker = executor
        .submit(move || {
            started.send(()).unwrap();
            blocked.recv().unwrap();
            1
        })
        .unwrap();

    running.recv().unwrap();

    let queued: Vec<_> = (0..5).map(|i| executor.submit(move || i).unwrap()).collect();

    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        release.send(()).unwrap();
    });

    executor.shutdown();
    releaser.join().unwrap();

    assert_eq!(blocker.get().unwrap(), 1);
    for result in queued {
        assert!(matches!(result.get(), Err(Error::BrokenTask)));
    }
}

#[test]
fn test_thread_pool_shutdown_releases_worker_blocked_on_local_task() {
    let executor = Arc::new(ThreadPoolExecutor::new("pool", 1, ThreadHooks::default()));
    let (started, running) = mpsc::channel::<()>();

    let outer = {
        let pool = executor.clone();
        executor
            .submit(move || {
                // Lands in this worker's local queue; the only worker is busy.
                let inner = pool.submit(|| 1).unwrap();
                started.send(()).unwrap();
                inner.get()
            })
            .unwrap()
    };

    running.recv().unwrap();

    let (done, finished) = mpsc::channel::<()>();
    let shutdown = {
        let executor = executor.clone();
        thread::spawn(move || {
            executor.shutdown();
            done.send(()).unwrap();
        })
    };

    assert!(
        finished.recv_timeout(Duration::from_secs(5)).is_ok(),
        "shutdown did not return"
    );
    shutdown.join().unwrap();

    assert!(outer.get().unwrap().unwrap_err().is_broken_task());
}

#[test]
fn test_worker_thread_is_fifo_on_one_thread() {
    let executor = WorkerThreadExecutor::default();
    let order = Arc::new(Mutex::new(Vec::new()));

    let results: Vec<_> = (0..50)
        .map(|i| {
            let order = order.clone();
            executor
                .submit(move || {
                    order.lock().unwrap().push(i);
                    thread::current().id()
                })
                .unwrap()
        })
        .collect();

    let ids: HashSet<_> = results.into_iter().map(|r| r.get().unwrap()).collect();

    assert_eq!(ids.len(), 1);
    assert_eq!(*order.lock().unwrap(), (0..50).collect::<Vec<_>>());
    assert_eq!(executor.max_concurrency_level(), 1);
}

#[test]
fn test_bulk_submit_and_post() {
    let executor = ThreadPoolExecutor::new("pool", 2, ThreadHooks::default());
    let counter = Arc::new(AtomicUsize::new(0));

    let callables: Vec<_> = (0..10).map(|i| move || i + 1).collect();
    let results = executor.bulk_submit(callables).unwrap();
    let values: Vec<_> = results.into_iter().map(|r| r.get().unwrap()).collect();
    assert_eq!(values, (1..=10).collect::<Vec<_>>());

    let (done, finished) = mpsc::channel();
    let callables: Vec<_> = (0..10)
        .map(|_| {
            let counter = counter.clone();
            let done = done.clone();
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                done.send(()).unwrap();
            }
        })
        .collect();

    executor.bulk_post(callables).unwrap();
    for _ in 0..10 {
        finished.recv().unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn test_thread_hooks_see_every_thread() {
    let started = Arc::new(Mutex::new(Vec::new()));
    let stopped = Arc::new(AtomicUsize::new(0));

    let hooks = {
        let started = started.clone();
        let stopped = stopped.clone();
        ThreadHooks::new()
            .on_start(move |name| started.lock().unwrap().push(name.to_owned()))
            .on_stop(move |_| {
                stopped.fetch_add(1, Ordering::SeqCst);
            })
    };

    let executor = ThreadPoolExecutor::new("hooked", 3, hooks);
    executor.submit(|| ()).unwrap().get().unwrap();
    executor.shutdown();

    let started = started.lock().unwrap();
    assert_eq!(started.len(), 3);
    assert!(started.iter().all(|name| name == "hooked worker"));
    assert_eq!(stopped.load(Ordering::SeqCst), 3);
}

#[test]
fn test_executor_as_trait_object() {
    let executor: Arc<dyn Executor> = Arc::new(WorkerThreadExecutor::default());

    let result = executor
        .spawn(async { "from a future" })
        .unwrap();

    assert_eq!(result.get().unwrap(), "from a future");
}
