// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Guarded facade over the collaborator's three callbacks.
//!
//! The embedding application supplies the raw callbacks; the panel checks
//! thread affinity and light range before forwarding, and raises a fatal
//! fault on violation. The checks are the contract, not a convenience:
//! several catalog entries exist specifically to trip them.

use std::sync::Arc;
use std::thread;

use lumen_rt::affinity::Affinity;
use lumen_rt::fault::Fault;

/// Number of indicator slots.
pub const LIGHT_COUNT: usize = 3;

/// The collaborator's raw callbacks. All three are affinity-only.
pub struct PanelHooks {
    pub lock_ui: Box<dyn Fn(bool) + Send + Sync>,
    pub reset: Box<dyn Fn() + Send + Sync>,
    pub light_up: Box<dyn Fn(usize) + Send + Sync>,
}

/// Thread-affine guard around [`PanelHooks`].
#[derive(Clone)]
pub struct Panel {
    inner: Arc<Inner>,
}

struct Inner {
    hooks: PanelHooks,
    affinity: Affinity,
}

impl Panel {
    pub fn new(hooks: PanelHooks, affinity: Affinity) -> Self {
        Self {
            inner: Arc::new(Inner { hooks, affinity }),
        }
    }

    /// Advisory UI-enable toggle.
    pub fn lock_ui(&self, locked: bool) {
        self.guard("lock_ui");
        (self.inner.hooks.lock_ui)(locked);
    }

    /// Clear all indicators.
    pub fn reset(&self) {
        self.guard("reset");
        (self.inner.hooks.reset)();
    }

    /// Set indicator `index` active.
    pub fn light_up(&self, index: usize) {
        self.guard("light_up");
        if index >= LIGHT_COUNT {
            self.inner
                .affinity
                .fatal()
                .raise(Fault::LightOutOfRange { index });
        }
        (self.inner.hooks.light_up)(index);
    }

    fn guard(&self, callback: &'static str) {
        if !self.inner.affinity.is_current() {
            self.inner.affinity.fatal().raise(Fault::AffinityViolation {
                callback,
                thread: thread::current().id(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_rt::affinity::AffinityThread;
    use lumen_rt::fault::FatalHook;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::mpsc;
    use std::sync::Mutex;

    fn recording_panel() -> (AffinityThread, Panel, Arc<Mutex<Vec<usize>>>, Arc<Mutex<Vec<Fault>>>) {
        let faults = Arc::new(Mutex::new(Vec::new()));
        let hook = {
            let faults = faults.clone();
            FatalHook::new(move |fault| faults.lock().unwrap().push(fault.clone()))
        };
        let owner = AffinityThread::start(hook);
        let lights = Arc::new(Mutex::new(Vec::new()));
        let hooks = PanelHooks {
            lock_ui: Box::new(|_| {}),
            reset: Box::new(|| {}),
            light_up: {
                let lights = lights.clone();
                Box::new(move |index| lights.lock().unwrap().push(index))
            },
        };
        let panel = Panel::new(hooks, owner.handle());
        (owner, panel, lights, faults)
    }

    #[test]
    fn calls_from_the_affinity_thread_pass() {
        let (owner, panel, lights, faults) = recording_panel();
        let (tx, rx) = mpsc::channel();
        owner.handle().post(move || {
            panel.lock_ui(true);
            panel.reset();
            panel.light_up(1);
            panel.lock_ui(false);
            tx.send(()).unwrap();
        });
        rx.recv().unwrap();
        assert_eq!(*lights.lock().unwrap(), vec![1]);
        assert!(faults.lock().unwrap().is_empty());
    }

    #[test]
    fn off_thread_calls_raise_an_affinity_violation() {
        let (_owner, panel, lights, faults) = recording_panel();
        let result = catch_unwind(AssertUnwindSafe(|| panel.light_up(0)));
        let payload = result.unwrap_err();
        assert!(matches!(
            payload.downcast_ref::<Fault>(),
            Some(Fault::AffinityViolation {
                callback: "light_up",
                ..
            })
        ));
        assert!(lights.lock().unwrap().is_empty());
        assert_eq!(faults.lock().unwrap().len(), 1);
    }

    #[test]
    fn out_of_range_index_is_fatal() {
        let (owner, panel, lights, faults) = recording_panel();
        owner.handle().post(move || panel.light_up(LIGHT_COUNT));
        let start = std::time::Instant::now();
        while faults.lock().unwrap().is_empty()
            && start.elapsed() < std::time::Duration::from_secs(5)
        {
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(matches!(
            faults.lock().unwrap()[0],
            Fault::LightOutOfRange { index } if index == LIGHT_COUNT
        ));
        assert!(lights.lock().unwrap().is_empty());
    }
}
