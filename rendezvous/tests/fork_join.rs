use rendezvous::{
    Error, Executor, ExecutorExt, ForkResult, InlineExecutor, LazyResult, ManualExecutor,
    ResultStatus, Task, ThreadHooks, ThreadPoolExecutor, fork_join,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Runs tasks inline and counts how many were enqueued.
#[derive(Default)]
struct CountingExecutor {
    inner: InlineExecutor,
    enqueued: AtomicUsize,
}

impl Executor for CountingExecutor {
    fn name(&self) -> &str {
        "counting_executor"
    }

    fn enqueue(&self, task: Task) -> Result<(), Error> {
        self.enqueued.fetch_add(1, Ordering::SeqCst);
        self.inner.enqueue(task)
    }

    fn max_concurrency_level(&self) -> usize {
        self.inner.max_concurrency_level()
    }

    fn shutdown_requested(&self) -> bool {
        self.inner.shutdown_requested()
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }
}

fn join<T: Send + 'static>(
    executor: Arc<dyn Executor>,
    branches: Vec<ForkResult<T>>,
) -> Vec<Result<T, Error>> {
    LazyResult::new(async move { Ok(fork_join(executor, branches)?.await) })
        .get()
        .unwrap()
        .into_iter()
        .map(|result| result.get())
        .collect()
}

#[test]
fn test_single_branch_is_never_enqueued() {
    let executor = Arc::new(CountingExecutor::default());

    let outcomes = join(executor.clone(), vec![ForkResult::new(async { Ok(1) })]);

    assert_eq!(outcomes[0].as_ref().unwrap(), &1);
    assert_eq!(executor.enqueued.load(Ordering::SeqCst), 0);
}

#[test]
fn test_all_but_last_branch_are_enqueued() {
    const BRANCHES: usize = 6;

    let executor = Arc::new(CountingExecutor::default());
    let branches = (0..BRANCHES)
        .map(|i| ForkResult::new(async move { Ok(i) }))
        .collect();

    let outcomes = join(executor.clone(), branches);

    let values: Vec<_> = outcomes.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, (0..BRANCHES).collect::<Vec<_>>());
    assert_eq!(executor.enqueued.load(Ordering::SeqCst), BRANCHES - 1);
}

#[test]
fn test_last_branch_runs_on_calling_thread() {
    let pool = Arc::new(ThreadPoolExecutor::new("pool", 2, ThreadHooks::default()));
    let caller = thread::current().id();

    let branches = (0..4)
        .map(|_| ForkResult::new(async { Ok(thread::current().id()) }))
        .collect();

    let outcomes = join(pool, branches);
    let ids: Vec<_> = outcomes.into_iter().map(Result::unwrap).collect();

    assert_eq!(ids[3], caller);
}

#[test]
fn test_branches_run_in_parallel() {
    let pool = Arc::new(ThreadPoolExecutor::new("pool", 4, ThreadHooks::default()));

    let branches = (0..4u64)
        .map(|i| {
            ForkResult::new(async move {
                thread::sleep(Duration::from_millis(20));
                Ok(i * i)
            })
        })
        .collect();

    let values: Vec<_> = join(pool, branches).into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![0, 1, 4, 9]);
}

#[test]
fn test_panicking_branch_does_not_affect_others() {
    let pool = Arc::new(ThreadPoolExecutor::new("pool", 2, ThreadHooks::default()));

    let branches = vec![
        ForkResult::new(async { Ok(1) }),
        ForkResult::new(async {
            if true {
                panic!("branch failed");
            }
            Ok(2)
        }),
        ForkResult::new(async { Ok(3) }),
    ];

    let outcomes = join(pool, branches);

    assert_eq!(outcomes[0].as_ref().unwrap(), &1);
    assert!(matches!(outcomes[1], Err(Error::Panicked { .. })));
    assert_eq!(outcomes[2].as_ref().unwrap(), &3);
}

#[test]
fn test_refused_branches_are_broken() {
    let manual = Arc::new(ManualExecutor::new());
    manual.shutdown();

    let branches = (0..3).map(|i| ForkResult::new(async move { Ok(i) })).collect();
    let outcomes = join(manual, branches);

    assert!(outcomes[0].as_ref().unwrap_err().is_broken_task());
    assert!(outcomes[1].as_ref().unwrap_err().is_broken_task());
    assert_eq!(outcomes[2].as_ref().unwrap(), &2);
}

#[test]
fn test_join_results_are_readable_without_waiting() {
    let executor: Arc<dyn Executor> = Arc::new(InlineExecutor::new());
    let branches = vec![
        ForkResult::new(async { Ok("a") }),
        ForkResult::new(async { Err(Error::BrokenTask) }),
    ];

    let joined = LazyResult::new(async move { Ok(fork_join(executor, branches)?.await) })
        .get()
        .unwrap();

    assert_eq!(joined[0].status(), ResultStatus::Value);
    assert_eq!(joined[1].status(), ResultStatus::Error);
}

#[test]
fn test_invalid_collections_are_rejected() {
    let executor: Arc<dyn Executor> = Arc::new(InlineExecutor::new());

    let error = fork_join::<i32>(executor.clone(), Vec::new()).err().unwrap();
    assert!(matches!(error, Error::InvalidArgument { method: "fork_join", .. }));

    let branches = vec![ForkResult::new(async { Ok(1) }), ForkResult::default()];
    let error = fork_join(executor, branches).err().unwrap();
    assert!(matches!(error, Error::Empty { .. }));
}

#[test]
fn test_as_root_continues_on_executor() {
    let manual = Arc::new(ManualExecutor::new());

    let root = ForkResult::new(async { Ok(thread::current().id()) }).as_root(manual.clone());
    let result = root.run();

    assert_eq!(manual.size(), 1);
    assert!(manual.loop_once().unwrap());
    assert_eq!(result.get().unwrap(), thread::current().id());
}

#[test]
fn test_fork_join_inside_spawned_work() {
    let pool = Arc::new(ThreadPoolExecutor::new("pool", 3, ThreadHooks::default()));

    let total = {
        let executor: Arc<dyn Executor> = pool.clone();
        pool.spawn(async move {
            let branches = (1..=10)
                .map(|i| ForkResult::new(async move { Ok(i) }))
                .collect();

            let joined = fork_join(executor, branches)?.await;
            joined.into_iter().map(|r| r.get()).sum::<Result<i32, Error>>()
        })
        .unwrap()
    };

    assert_eq!(total.get().unwrap().unwrap(), 55);
}
