// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Completion-order combinator over a set of pending promises.
//!
//! `first_of` yields members one at a time in the order they settle,
//! removing each from the set as it is yielded. The usual loop races a set
//! down to empty, reacting to exactly one settled member per iteration.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;

use crate::fault::TaskError;
use crate::promise::Promise;

/// Calling [`first_of`] on an empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("first_of called on an empty pending set")]
pub struct EmptySet;

impl From<EmptySet> for TaskError {
    fn from(e: EmptySet) -> Self {
        TaskError::Failed(e.to_string())
    }
}

/// The in-flight promises one combinator loop is racing.
pub struct PendingSet<T> {
    items: Vec<Promise<T>>,
}

impl<T> PendingSet<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, promise: Promise<T>) {
        self.items.push(promise);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for PendingSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Yield the first member of `set` to settle, removing it from the set.
///
/// Resolves as soon as at least one member has settled, to that member and
/// its result. Ties are broken arbitrarily; no order is promised among
/// members that settle together. An empty set is a contract violation and
/// yields [`EmptySet`].
pub fn first_of<T: Clone>(set: &mut PendingSet<T>) -> FirstOf<'_, T> {
    FirstOf { set }
}

/// Future returned by [`first_of`].
pub struct FirstOf<'a, T> {
    set: &'a mut PendingSet<T>,
}

impl<T: Clone> Future for FirstOf<'_, T> {
    type Output = Result<(Promise<T>, Result<T, TaskError>), EmptySet>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let items = &mut self.get_mut().set.items;
        if items.is_empty() {
            return Poll::Ready(Err(EmptySet));
        }
        for i in 0..items.len() {
            if let Some(result) = items[i].try_result() {
                let settled = items.remove(i);
                return Poll::Ready(Ok((settled, result)));
            }
        }
        for item in items.iter() {
            item.register(cx.waker());
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise::promise;
    use crate::task::block_on;
    use crate::timer;
    use std::time::Duration;

    #[test]
    fn empty_set_is_invalid() {
        let mut set = PendingSet::<u32>::new();
        assert_eq!(block_on(first_of(&mut set)).unwrap_err(), EmptySet);
    }

    #[test]
    fn singleton_set_yields_its_member() {
        let mut set = PendingSet::new();
        set.push(Promise::resolved(42));
        let (_, result) = block_on(first_of(&mut set)).unwrap();
        assert_eq!(result.unwrap(), 42);
        assert!(set.is_empty());
    }

    #[test]
    fn yields_in_completion_order_not_insertion_order() {
        let (slow, slow_completer) = promise();
        let mut set = PendingSet::new();
        set.push(slow);
        set.push(Promise::resolved("second in, first out"));

        let (_, result) = block_on(first_of(&mut set)).unwrap();
        assert_eq!(result.unwrap(), "second in, first out");
        assert_eq!(set.len(), 1);

        slow_completer.resolve("finally");
        let (_, result) = block_on(first_of(&mut set)).unwrap();
        assert_eq!(result.unwrap(), "finally");
        assert!(set.is_empty());
    }

    #[test]
    fn each_member_yielded_exactly_once() {
        let mut set = PendingSet::new();
        for i in 0..3 {
            set.push(Promise::resolved(i));
        }
        let mut seen = Vec::new();
        while !set.is_empty() {
            let (_, result) = block_on(first_of(&mut set)).unwrap();
            seen.push(result.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn suspends_until_some_member_settles() {
        let mut set = PendingSet::new();
        set.push(timer::delay(Duration::from_millis(50)));
        set.push(timer::delay(Duration::from_millis(5)));
        let (_, result) = block_on(first_of(&mut set)).unwrap();
        assert!(result.is_ok());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn failed_members_are_yielded_like_any_other() {
        let (p, completer) = promise::<()>();
        completer.fail(TaskError::Failed("bad".to_string()));
        let mut set = PendingSet::new();
        set.push(p);
        let (_, result) = block_on(first_of(&mut set)).unwrap();
        assert!(matches!(result, Err(TaskError::Failed(msg)) if msg == "bad"));
    }

    fn tagged_delay(millis: u64, tag: usize) -> Promise<usize> {
        let (p, completer) = promise();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(millis));
            completer.resolve(tag);
        });
        p
    }

    // The shorter of two real delays wins the race.
    #[test]
    fn races_real_delays() {
        let mut set = PendingSet::new();
        set.push(tagged_delay(60, 0));
        set.push(tagged_delay(5, 1));
        let (_, result) = block_on(first_of(&mut set)).unwrap();
        assert_eq!(result.unwrap(), 1);
    }
}
