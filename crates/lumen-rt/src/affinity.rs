// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Affinity channel: a single-consumer job queue bound to one thread.
//!
//! Jobs posted from any thread execute later on the affinity thread, FIFO
//! per posting sender. The drain loop doubles as a cooperative executor:
//! spawned futures are polled inside posted jobs and their wakers post the
//! next poll, so an await yields the thread back to the queue instead of
//! blocking it.

use std::future::Future;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crate::fault::{FatalHook, Fault, TaskError};
use crate::promise::{promise, Promise};
use crate::task::RawTask;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Owns the drain-loop thread.
///
/// Dropping detaches the thread (the loop exits once every posting handle
/// is gone); [`AffinityThread::shutdown`] joins it explicitly.
pub struct AffinityThread {
    handle: JoinHandle<()>,
    affinity: Affinity,
}

impl AffinityThread {
    /// Spawn the drain loop.
    pub fn start(fatal: FatalHook) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("affinity".to_string())
            .spawn(move || {
                for job in rx {
                    job();
                }
                tracing::debug!("affinity queue closed, drain loop exiting");
            })
            .expect("failed to spawn affinity thread");
        let affinity = Affinity {
            tx,
            id: handle.thread().id(),
            fatal,
        };
        Self { handle, affinity }
    }

    /// Cloneable posting/spawning handle.
    pub fn handle(&self) -> Affinity {
        self.affinity.clone()
    }

    /// Close this owner's sender and join the drain loop. Queued jobs still
    /// run; the loop exits once every other handle is dropped too. Not for
    /// deadlocked consumers; drop the owner instead.
    pub fn shutdown(self) {
        let Self { handle, affinity } = self;
        drop(affinity);
        let _ = handle.join();
    }
}

/// Posting and spawning handle to the affinity thread.
#[derive(Clone)]
pub struct Affinity {
    tx: mpsc::Sender<Job>,
    id: ThreadId,
    fatal: FatalHook,
}

impl Affinity {
    /// True when the caller is on the affinity thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }

    /// The fatal escalation hook shared by everything bound to this thread.
    pub fn fatal(&self) -> &FatalHook {
        &self.fatal
    }

    /// Enqueue `job` for execution on the affinity thread, FIFO with
    /// respect to this sender's other posts.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Box::new(job)).is_err() {
            tracing::warn!("post dropped: affinity thread is gone");
        }
    }

    /// Schedule `future` on the affinity thread's cooperative executor.
    ///
    /// Polls run as posted jobs; each suspension yields the thread back to
    /// the queue and resumption happens on this same thread. The returned
    /// promise settles with the future's output.
    pub fn spawn<T, F>(&self, future: F) -> Promise<T>
    where
        T: Clone + Send + 'static,
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let (promise, completer) = promise();
        let task = self.task(async move {
            completer.settle(future.await);
        });
        task.start();
        promise
    }

    /// Fire-and-forget variant of [`Affinity::spawn`]. A failure here has
    /// no observer: it escalates through the fatal hook, which takes the
    /// drain loop down with it.
    pub fn spawn_detached<F>(&self, future: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let fatal = self.fatal.clone();
        let task = self.task(async move {
            if let Err(error) = future.await {
                fatal.raise(Fault::Unobserved(error));
            }
        });
        task.start();
    }

    fn task<F>(&self, future: F) -> Arc<RawTask>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let affinity = self.clone();
        RawTask::new(
            Box::pin(future),
            Arc::new(move |task: Arc<RawTask>| {
                affinity.post(move || task.run());
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    fn wait_until(timeout: Duration, pred: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if pred() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        pred()
    }

    #[test]
    fn posted_jobs_run_on_the_affinity_thread() {
        let owner = AffinityThread::start(FatalHook::default());
        let affinity = owner.handle();
        let (tx, rx) = mpsc::channel();
        let probe = affinity.clone();
        affinity.post(move || {
            tx.send((thread::current().id(), probe.is_current())).unwrap();
        });
        let (id, on_affinity) = rx.recv().unwrap();
        assert_ne!(id, thread::current().id());
        assert!(on_affinity);
        assert!(!affinity.is_current());
        owner.shutdown();
    }

    #[test]
    fn posts_from_one_sender_stay_in_order() {
        let owner = AffinityThread::start(FatalHook::default());
        let affinity = owner.handle();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let seen = seen.clone();
            affinity.post(move || seen.lock().unwrap().push(i));
        }
        drop(affinity);
        owner.shutdown();
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn spawn_settles_its_promise() {
        let owner = AffinityThread::start(FatalHook::default());
        let p = owner.handle().spawn(async { Ok(7) });
        assert_eq!(p.wait().unwrap(), 7);
    }

    #[test]
    fn suspension_resumes_on_the_affinity_thread() {
        let owner = AffinityThread::start(FatalHook::default());
        let affinity = owner.handle();
        let (tx, rx) = mpsc::channel();
        affinity.post(move || tx.send(thread::current().id()).unwrap());
        let affinity_id = rx.recv().unwrap();

        let p = affinity.spawn(async {
            timer::delay(Duration::from_millis(5)).await?;
            Ok(thread::current().id())
        });
        assert_eq!(p.wait().unwrap(), affinity_id);
    }

    #[test]
    fn detached_failure_escalates_and_kills_the_loop() {
        let faults = Arc::new(Mutex::new(Vec::new()));
        let hook = {
            let faults = faults.clone();
            FatalHook::new(move |fault| faults.lock().unwrap().push(fault.clone()))
        };
        let owner = AffinityThread::start(hook);
        owner.handle().spawn_detached(async {
            Err(TaskError::Failed("dropped on the floor".to_string()))
        });
        assert!(wait_until(Duration::from_secs(5), || {
            !faults.lock().unwrap().is_empty()
        }));
        assert!(matches!(
            faults.lock().unwrap()[0],
            Fault::Unobserved(TaskError::Failed(_))
        ));
    }
}
