// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Background dispatcher: work on worker threads, off the affinity thread.
//!
//! One OS thread per work item. Future-returning variants settle a promise
//! with the outcome, panics included; fire-and-forget variants have no
//! observer, so a failure escalates through the fatal hook and kills the
//! worker.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::fault::{FatalHook, Fault, TaskError};
use crate::promise::{promise, Promise};
use crate::task::block_on;

/// Spawns worker threads for background work.
#[derive(Clone)]
pub struct Dispatcher {
    fatal: FatalHook,
}

impl Dispatcher {
    pub fn new(fatal: FatalHook) -> Self {
        Self { fatal }
    }

    /// Run `work` once on a fresh worker thread.
    ///
    /// The promise settles with the outcome; a panic settles it as Failed
    /// with the panic message, except a `Fault` payload, which is resumed
    /// untouched so contract violations stay fatal.
    pub fn run<T, F>(&self, work: F) -> Promise<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        let (p, completer) = promise();
        spawn_worker(move || match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(outcome) => completer.settle(outcome),
            Err(payload) => completer.fail(TaskError::Panicked(panic_message(payload))),
        });
        p
    }

    /// Fire-and-forget variant of [`Dispatcher::run`]. A failure has no
    /// observer and escalates through the fatal hook.
    pub fn run_detached<F>(&self, work: F)
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        let fatal = self.fatal.clone();
        spawn_worker(move || match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => fatal.raise(Fault::Unobserved(error)),
            Err(payload) => {
                fatal.raise(Fault::Unobserved(TaskError::Panicked(panic_message(payload))))
            }
        });
    }

    /// Drive `future` to completion on a worker thread. Every continuation
    /// in it runs there, detached from the affinity thread.
    pub fn run_async<T, F>(&self, future: F) -> Promise<T>
    where
        T: Clone + Send + 'static,
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        self.run(move || block_on(future))
    }

    /// Fire-and-forget variant of [`Dispatcher::run_async`].
    pub fn run_async_detached<F>(&self, future: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.run_detached(move || block_on(future))
    }
}

fn spawn_worker(work: impl FnOnce() + Send + 'static) {
    thread::Builder::new()
        .name("lumen-worker".to_string())
        .spawn(work)
        .expect("failed to spawn worker thread");
}

/// Extract a printable message from a panic payload.
///
/// A `Fault` payload is not a message: it is resumed, so a raised fault
/// can never be converted back into a catchable error.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let payload = match payload.downcast::<Fault>() {
        Ok(fault) => panic::resume_unwind(fault),
        Err(other) => other,
    };
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer;
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::{Duration, Instant};

    #[test]
    fn run_returns_the_outcome() {
        let dispatcher = Dispatcher::new(FatalHook::default());
        let p = dispatcher.run(|| Ok(5));
        assert_eq!(p.wait().unwrap(), 5);
    }

    #[test]
    fn run_executes_off_the_calling_thread() {
        let dispatcher = Dispatcher::new(FatalHook::default());
        let (tx, rx) = mpsc::channel();
        dispatcher
            .run(move || {
                tx.send(thread::current().id()).unwrap();
                Ok(())
            })
            .wait()
            .unwrap();
        assert_ne!(rx.recv().unwrap(), thread::current().id());
    }

    #[test]
    fn run_converts_panics_to_failures() {
        let dispatcher = Dispatcher::new(FatalHook::default());
        let p = dispatcher.run(|| -> Result<i32, TaskError> { panic!("boom") });
        match p.wait() {
            Err(TaskError::Panicked(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected Panicked, got {:?}", other),
        }
    }

    #[test]
    fn run_detached_failure_escalates() {
        let faults = Arc::new(Mutex::new(Vec::new()));
        let hook = {
            let faults = faults.clone();
            FatalHook::new(move |fault| faults.lock().unwrap().push(fault.clone()))
        };
        Dispatcher::new(hook)
            .run_detached(|| Err(TaskError::Failed("nobody saw it".to_string())));

        let start = Instant::now();
        while faults.lock().unwrap().is_empty() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(matches!(
            faults.lock().unwrap()[0],
            Fault::Unobserved(TaskError::Failed(_))
        ));
    }

    #[test]
    fn run_async_detached_failure_escalates_after_suspension() {
        let faults = Arc::new(Mutex::new(Vec::new()));
        let hook = {
            let faults = faults.clone();
            FatalHook::new(move |fault| faults.lock().unwrap().push(fault.clone()))
        };
        Dispatcher::new(hook).run_async_detached(async {
            timer::delay(Duration::from_millis(5)).await?;
            Err(TaskError::Failed("late and unobserved".to_string()))
        });

        let start = Instant::now();
        while faults.lock().unwrap().is_empty() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(matches!(
            faults.lock().unwrap()[0],
            Fault::Unobserved(TaskError::Failed(_))
        ));
    }

    #[test]
    fn run_async_drives_suspending_work() {
        let dispatcher = Dispatcher::new(FatalHook::default());
        let p = dispatcher.run_async(async {
            timer::delay(Duration::from_millis(5)).await?;
            Ok(9)
        });
        assert_eq!(p.wait().unwrap(), 9);
    }
}
