use rendezvous::executor::UNBOUNDED_CONCURRENCY;
use rendezvous::{Error, Executor, ExecutorExt, ManualExecutor};

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_loop_n_runs_in_fifo_order() {
    let executor = ManualExecutor::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..5 {
        let order = order.clone();
        executor.post(move || order.lock().unwrap().push(i)).unwrap();
    }

    assert_eq!(executor.size(), 5);
    assert_eq!(executor.loop_n(3).unwrap(), 3);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(executor.size(), 2);

    assert_eq!(executor.loop_n(10).unwrap(), 2);
    assert!(executor.is_empty());
    assert!(!executor.loop_once().unwrap());
}

#[test]
fn test_loop_n_zero_runs_nothing() {
    let executor = ManualExecutor::new();
    executor.post(|| {}).unwrap();

    assert_eq!(executor.loop_n(0).unwrap(), 0);
    assert_eq!(executor.size(), 1);
}

#[test]
fn test_shutdown_releases_blocked_waiter() {
    let executor = Arc::new(ManualExecutor::new());

    let waiter = {
        let executor = executor.clone();
        thread::spawn(move || executor.wait_for_tasks(10))
    };

    thread::sleep(Duration::from_millis(50));
    let pending: Vec<_> = (0..2).map(|i| executor.submit(move || i).unwrap()).collect();
    executor.shutdown();

    let error = waiter.join().unwrap().unwrap_err();
    assert!(error.is_shutdown());

    for result in pending {
        assert!(matches!(result.get(), Err(Error::BrokenTask)));
    }
}

#[test]
fn test_every_operation_fails_after_shutdown() {
    let executor = ManualExecutor::new();
    executor.shutdown();

    assert_eq!(
        executor.post(|| {}).unwrap_err().to_string(),
        "manual_executor::post() - manual_executor has already been shut down."
    );
    assert!(executor.submit(|| 1).unwrap_err().is_shutdown());
    assert!(executor.loop_once().unwrap_err().is_shutdown());
    assert!(executor.loop_n(4).unwrap_err().is_shutdown());
    assert!(executor
        .loop_for(4, Duration::from_millis(10))
        .unwrap_err()
        .is_shutdown());
    assert!(executor.clear().unwrap_err().is_shutdown());
    assert!(executor.wait_for_task().unwrap_err().is_shutdown());
    assert!(executor.wait_for_tasks(0).unwrap_err().is_shutdown());
    assert!(executor
        .wait_for_tasks_for(3, Duration::from_millis(10))
        .unwrap_err()
        .is_shutdown());
    assert_eq!(executor.size(), 0);
}

#[test]
fn test_zero_count_loops_return_immediately_after_shutdown() {
    let executor = ManualExecutor::new();
    executor.shutdown();

    assert_eq!(executor.loop_n(0).unwrap(), 0);
    assert_eq!(executor.loop_for(0, Duration::from_secs(10)).unwrap(), 0);
}

#[test]
fn test_clear_interrupts_queued_tasks() {
    let executor = ManualExecutor::new();
    let results: Vec<_> = (0..3).map(|i| executor.submit(move || i).unwrap()).collect();

    assert_eq!(executor.clear().unwrap(), 3);
    assert!(executor.is_empty());

    for result in results {
        assert!(matches!(result.get(), Err(Error::BrokenTask)));
    }
}

#[test]
fn test_wait_for_tasks_for_times_out() {
    let executor = ManualExecutor::new();
    executor.post(|| {}).unwrap();

    let start = Instant::now();
    let queued = executor
        .wait_for_tasks_for(3, Duration::from_millis(50))
        .unwrap();

    assert_eq!(queued, 1);
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(executor.wait_for_task_for(Duration::ZERO).unwrap());
}

#[test]
fn test_wait_for_tasks_returns_once_enough_arrive() {
    let executor = Arc::new(ManualExecutor::new());

    let producer = {
        let executor = executor.clone();
        thread::spawn(move || {
            for _ in 0..3 {
                thread::sleep(Duration::from_millis(10));
                executor.post(|| {}).unwrap();
            }
        })
    };

    executor.wait_for_tasks(3).unwrap();
    assert!(executor.size() >= 3);
    producer.join().unwrap();
}

#[test]
fn test_loop_for_waits_for_late_tasks() {
    let executor = Arc::new(ManualExecutor::new());

    let producer = {
        let executor = executor.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            executor.post(|| {}).unwrap();
            executor.post(|| {}).unwrap();
        })
    };

    let executed = executor.loop_for(2, Duration::from_secs(5)).unwrap();
    assert_eq!(executed, 2);
    producer.join().unwrap();
}

#[test]
fn test_loop_once_for_times_out_on_empty_queue() {
    let executor = ManualExecutor::new();

    let start = Instant::now();
    assert!(!executor.loop_once_for(Duration::from_millis(30)).unwrap());
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_manual_executor_contract() {
    let executor = ManualExecutor::new();

    assert_eq!(executor.name(), "manual_executor");
    assert_eq!(executor.max_concurrency_level(), UNBOUNDED_CONCURRENCY);
    assert!(!executor.shutdown_requested());
}
