// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Cooperative task machinery and the thread-blocking future driver.
//!
//! A task is a type-erased future plus an atomic state machine. Polls are
//! ordinary jobs handed to a schedule callback, and the waker re-schedules
//! through the same callback, so where a task runs is decided entirely by
//! whoever constructed it. The affinity executor schedules polls as queue
//! jobs; `block_on` drives a future on the calling thread instead.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Wake, Waker};
use std::thread::{self, Thread};

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub(crate) type ScheduleFn = Arc<dyn Fn(Arc<RawTask>) + Send + Sync>;

/// Task lifecycle states.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskState {
    /// A poll job is queued.
    Ready = 0,
    /// Currently being polled.
    Running = 1,
    /// Parked, waiting for a waker.
    Waiting = 2,
    /// Woken while Running; must be re-queued after the poll.
    Woken = 3,
    /// Finished; the future has been dropped.
    Complete = 4,
}

impl TaskState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Ready,
            1 => Self::Running,
            2 => Self::Waiting,
            3 => Self::Woken,
            _ => Self::Complete,
        }
    }
}

/// The task object shared between its executor and its wakers.
pub(crate) struct RawTask {
    state: AtomicU8,
    future: Mutex<Option<BoxFuture>>,
    schedule: ScheduleFn,
}

impl RawTask {
    /// Create a task in the Ready state. Call [`RawTask::start`] once to
    /// enqueue the first poll.
    pub fn new(future: BoxFuture, schedule: ScheduleFn) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(TaskState::Ready as u8),
            future: Mutex::new(Some(future)),
            schedule,
        })
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Enqueue the initial poll.
    pub fn start(self: &Arc<Self>) {
        (self.schedule)(self.clone());
    }

    /// Run one poll. Called only from the schedule queue, so polls never
    /// overlap; the future mutex backs that up.
    pub fn run(self: &Arc<Self>) {
        if self.state() == TaskState::Complete {
            return;
        }
        self.state.store(TaskState::Running as u8, Ordering::Release);

        let waker = Waker::from(Arc::new(TaskWaker { task: self.clone() }));
        let mut cx = Context::from_waker(&waker);

        let completed = {
            let mut slot = self.future.lock().unwrap();
            match slot.as_mut() {
                Some(future) => match future.as_mut().poll(&mut cx) {
                    Poll::Ready(()) => {
                        *slot = None;
                        true
                    }
                    Poll::Pending => false,
                },
                None => true,
            }
        };

        if completed {
            self.state.store(TaskState::Complete as u8, Ordering::Release);
            return;
        }

        // Running -> Waiting, unless a waker fired mid-poll and moved us to
        // Woken; that wakeup would be lost without the re-queue here.
        let parked = self.state.compare_exchange(
            TaskState::Running as u8,
            TaskState::Waiting as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if parked.is_err() {
            self.state.store(TaskState::Ready as u8, Ordering::Release);
            (self.schedule)(self.clone());
        }
    }
}

/// Waker that re-schedules its task through the task's own callback.
struct TaskWaker {
    task: Arc<RawTask>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        loop {
            match self.task.state() {
                TaskState::Waiting => {
                    if self
                        .task
                        .state
                        .compare_exchange(
                            TaskState::Waiting as u8,
                            TaskState::Ready as u8,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        (self.task.schedule)(self.task.clone());
                        return;
                    }
                }
                TaskState::Running => {
                    if self
                        .task
                        .state
                        .compare_exchange(
                            TaskState::Running as u8,
                            TaskState::Woken as u8,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        return;
                    }
                }
                // Already queued, already flagged, or already done.
                TaskState::Ready | TaskState::Woken | TaskState::Complete => return,
            }
        }
    }
}

/// Drive `future` to completion on the calling thread.
///
/// Parks the thread between polls; the waker unparks it. This is true
/// blocking: running it on the affinity thread halts the drain loop for
/// the duration.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let waker = Waker::from(Arc::new(UnparkWaker {
        thread: thread::current(),
    }));
    let mut cx = Context::from_waker(&waker);
    let mut future = Box::pin(future);
    loop {
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(value) => return value,
            Poll::Pending => thread::park(),
        }
    }
}

struct UnparkWaker {
    thread: Thread,
}

impl Wake for UnparkWaker {
    fn wake(self: Arc<Self>) {
        self.thread.unpark();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.thread.unpark();
    }
}
