// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Promise: a value or failure available at some future time.
//!
//! Pending, then Resolved or Failed, exactly once. The write side is a
//! by-value `Completer`, so double settlement is unrepresentable. Any
//! number of observers: `.await` (cooperative), `wait()` (blocks the
//! calling OS thread), or `try_result()` (non-blocking peek).

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex};
use std::task::{Context, Poll, Waker};

use crate::fault::TaskError;

#[derive(Debug)]
enum State<T> {
    /// Not settled yet; wakers to fire on settlement.
    Pending { wakers: Vec<Waker> },
    /// Settled. Cloned out to each observer.
    Settled(Result<T, TaskError>),
}

#[derive(Debug)]
struct Shared<T> {
    state: Mutex<State<T>>,
    settled: Condvar,
}

/// Read side of a promise. Clone freely; every clone observes the same
/// settlement.
#[derive(Debug)]
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

/// Write side of a promise. Consumed by `resolve`/`fail`/`settle`.
pub struct Completer<T> {
    shared: Arc<Shared<T>>,
}

/// Create a pending promise and its completer.
pub fn promise<T>() -> (Promise<T>, Completer<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending { wakers: Vec::new() }),
        settled: Condvar::new(),
    });
    (
        Promise {
            shared: shared.clone(),
        },
        Completer { shared },
    )
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Promise {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone> Promise<T> {
    /// A promise that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        let (promise, completer) = promise();
        completer.resolve(value);
        promise
    }

    pub fn is_settled(&self) -> bool {
        matches!(*self.shared.state.lock().unwrap(), State::Settled(_))
    }

    /// Non-blocking peek at the settled result.
    pub fn try_result(&self) -> Option<Result<T, TaskError>> {
        match &*self.shared.state.lock().unwrap() {
            State::Pending { .. } => None,
            State::Settled(result) => Some(result.clone()),
        }
    }

    /// Block the calling OS thread until the promise settles.
    ///
    /// This is the forced synchronous wait. Calling it on a thread whose
    /// own queue must run the settling work deadlocks; that hazard is load
    /// bearing for the catalog and is not papered over here.
    pub fn wait(&self) -> Result<T, TaskError> {
        let mut state = self.shared.state.lock().unwrap();
        loop {
            match &*state {
                State::Settled(result) => return result.clone(),
                State::Pending { .. } => state = self.shared.settled.wait(state).unwrap(),
            }
        }
    }

    /// Register `waker` to fire once the promise settles. Fires immediately
    /// when already settled, so a racing settlement cannot be missed.
    pub(crate) fn register(&self, waker: &Waker) {
        let mut state = self.shared.state.lock().unwrap();
        match &mut *state {
            State::Pending { wakers } => {
                if !wakers.iter().any(|w| w.will_wake(waker)) {
                    wakers.push(waker.clone());
                }
            }
            State::Settled(_) => waker.wake_by_ref(),
        }
    }
}

impl<T: Clone> Future for Promise<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock().unwrap();
        match &mut *state {
            State::Settled(result) => Poll::Ready(result.clone()),
            State::Pending { wakers } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T> Completer<T> {
    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn fail(self, error: TaskError) {
        self.settle(Err(error));
    }

    /// Settle with an already-formed result.
    pub fn settle(self, result: Result<T, TaskError>) {
        let wakers = {
            let mut state = self.shared.state.lock().unwrap();
            match mem::replace(&mut *state, State::Settled(result)) {
                State::Pending { wakers } => wakers,
                // A completer is consumed by settling, so this arm cannot run.
                State::Settled(_) => unreachable!("promise settled twice"),
            }
        };
        self.shared.settled.notify_all();
        for waker in wakers {
            waker.wake();
        }
    }
}
