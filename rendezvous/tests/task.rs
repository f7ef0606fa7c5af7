use rendezvous::{
    Error, LazyResult, ManualExecutor, ResultStatus, Task, TaskState, TaskStatus, resume_on,
};

use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::task::{Context, Poll, Wake, Waker};
use std::thread;

struct CountingWaker(AtomicUsize);

impl Wake for CountingWaker {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_waker() -> (Waker, Arc<CountingWaker>) {
    let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
    (Waker::from(counter.clone()), counter)
}

#[test]
fn test_run_resumes_normally() {
    let (waker, wakes) = counting_waker();
    let state = Arc::new(TaskState::with_handle(waker));

    Task::new(state.clone()).run();

    assert_eq!(state.status(), TaskStatus::Started);
    assert_eq!(wakes.0.load(Ordering::SeqCst), 1);
    assert!(state.resumed().is_ok());
}

#[test]
fn test_drop_interrupts() {
    let (waker, wakes) = counting_waker();
    let state = Arc::new(TaskState::with_handle(waker));

    drop(Task::new(state.clone()));

    assert_eq!(state.status(), TaskStatus::Interrupted);
    assert_eq!(wakes.0.load(Ordering::SeqCst), 1);
    assert!(matches!(state.resumed(), Err(Error::BrokenTask)));
}

#[test]
fn test_empty_task_does_nothing() {
    let task = Task::default();
    assert!(task.is_empty());
    task.run();

    drop(Task::default());
}

#[test]
fn test_handle_set_after_creation() {
    let (waker, wakes) = counting_waker();
    let state = Arc::new(TaskState::new());
    let task = Task::new(state.clone());

    assert_eq!(state.status(), TaskStatus::Idle);
    state.set_handle(&waker);
    task.run();

    assert_eq!(wakes.0.load(Ordering::SeqCst), 1);
}

#[test]
fn test_run_or_drop_resumes_exactly_once() {
    for i in 0..200 {
        let (waker, wakes) = counting_waker();
        let state = Arc::new(TaskState::with_handle(waker));
        let task = Task::new(state.clone());
        let barrier = Arc::new(Barrier::new(2));

        let handle = {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    task.run();
                } else {
                    drop(task);
                }
            })
        };

        barrier.wait();
        handle.join().unwrap();

        assert_eq!(wakes.0.load(Ordering::SeqCst), 1);
        let expected = if i % 2 == 0 {
            TaskStatus::Started
        } else {
            TaskStatus::Interrupted
        };
        assert_eq!(state.status(), expected);
    }
}

#[test]
fn test_resume_on_continues_where_task_runs() {
    let manual = Arc::new(ManualExecutor::new());

    let lazy = {
        let manual = manual.clone();
        LazyResult::new(async move {
            resume_on(&*manual).await?;
            Ok(thread::current().id())
        })
    };

    let result = lazy.run();
    assert_eq!(manual.size(), 1);
    assert_eq!(result.status().unwrap(), ResultStatus::Idle);

    let driver = {
        let manual = manual.clone();
        thread::spawn(move || {
            assert!(manual.loop_once().unwrap());
            thread::current().id()
        })
    };

    let driver_id = driver.join().unwrap();
    assert_eq!(result.get().unwrap(), driver_id);
}

#[test]
fn test_resume_on_wakes_the_latest_waker() {
    let manual = ManualExecutor::new();
    let mut future = pin!(resume_on(&manual));

    let (first, first_wakes) = counting_waker();
    let (second, second_wakes) = counting_waker();

    assert!(future.as_mut().poll(&mut Context::from_waker(&first)).is_pending());
    assert!(future.as_mut().poll(&mut Context::from_waker(&second)).is_pending());
    assert_eq!(manual.size(), 1);

    assert!(manual.loop_once().unwrap());

    assert_eq!(first_wakes.0.load(Ordering::SeqCst), 0);
    assert_eq!(second_wakes.0.load(Ordering::SeqCst), 1);
    assert!(matches!(
        future.as_mut().poll(&mut Context::from_waker(&second)),
        Poll::Ready(Ok(()))
    ));
}

#[test]
fn test_set_handle_replaces_previous_handle() {
    let (first, first_wakes) = counting_waker();
    let (second, second_wakes) = counting_waker();
    let state = Arc::new(TaskState::with_handle(first));

    state.set_handle(&second);
    Task::new(state).run();

    assert_eq!(first_wakes.0.load(Ordering::SeqCst), 0);
    assert_eq!(second_wakes.0.load(Ordering::SeqCst), 1);
}

#[test]
fn test_resume_on_dropped_task_is_broken() {
    let manual = Arc::new(ManualExecutor::new());

    let lazy = {
        let manual = manual.clone();
        LazyResult::new(async move {
            resume_on(&*manual).await?;
            Ok(())
        })
    };

    let result = lazy.run();
    assert_eq!(manual.clear().unwrap(), 1);

    assert!(matches!(result.get(), Err(Error::BrokenTask)));
}

#[test]
fn test_resume_on_shut_down_executor_fails() {
    let manual = Arc::new(ManualExecutor::new());
    rendezvous::Executor::shutdown(&*manual);

    let lazy = {
        let manual = manual.clone();
        LazyResult::new(async move {
            resume_on(&*manual).await?;
            Ok(())
        })
    };

    let error = lazy.get().unwrap_err();
    assert!(error.is_shutdown());
}
