// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Delay and blocking sleep.
//!
//! `delay` is the simulated slow operation: it suspends an awaiter and
//! resolves from a timer thread. `block_for` halts the calling thread
//! outright; the two are deliberately distinct operations.

use std::thread;
use std::time::Duration;

use crate::promise::{promise, Promise};

/// A promise that resolves no earlier than `duration` from now, from a
/// dedicated timer thread. It only ever resolves; it never fails.
pub fn delay(duration: Duration) -> Promise<()> {
    let (p, completer) = promise();
    thread::Builder::new()
        .name("lumen-timer".to_string())
        .spawn(move || {
            thread::sleep(duration);
            completer.resolve(());
        })
        .expect("failed to spawn timer thread");
    p
}

/// Halt the calling thread for `duration`.
pub fn block_for(duration: Duration) {
    thread::sleep(duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::block_on;
    use std::time::Instant;

    #[test]
    fn delay_resolves_after_the_duration() {
        let start = Instant::now();
        block_on(delay(Duration::from_millis(20))).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(18));
    }

    #[test]
    fn delay_zero_resolves() {
        block_on(delay(Duration::ZERO)).unwrap();
    }

    #[test]
    fn delay_settles_off_thread_without_an_awaiter() {
        let p = delay(Duration::from_millis(5));
        assert!(p.wait().is_ok());
    }

    #[test]
    fn block_for_halts_the_caller() {
        let start = Instant::now();
        block_for(Duration::from_millis(10));
        assert!(start.elapsed() >= Duration::from_millis(9));
    }
}
