// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Failure taxonomy and the fatal escalation path.
//!
//! Two tiers: `TaskError` travels through promise chains and is catchable
//! by whoever observes the promise; `Fault` is a contract violation with
//! no legitimate observer and terminates the context that raised it.

use std::panic;
use std::sync::Arc;
use std::thread::ThreadId;

use thiserror::Error;

/// A recoverable task failure. Settles a promise as Failed and propagates
/// to whoever awaits or waits on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The work returned an error.
    #[error("task failed: {0}")]
    Failed(String),
    /// The work panicked with the given message.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// A fatal contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A collaborator callback was invoked off the affinity thread.
    #[error("affinity violation: `{callback}` called from thread {thread:?}")]
    AffinityViolation {
        callback: &'static str,
        thread: ThreadId,
    },
    /// A light index outside the panel.
    #[error("light index {index} is out of range")]
    LightOutOfRange { index: usize },
    /// A failure inside fire-and-forget work that nothing observes.
    #[error("unobserved failure in detached work: {0}")]
    Unobserved(TaskError),
}

/// Escalation path for faults.
///
/// `raise` invokes the installed handler and then panics with the fault as
/// payload, killing the hosting context: a worker thread for background
/// fire-and-forget work, the affinity drain loop for detached affinity
/// tasks. The default handler only logs; embedders wanting a literal
/// process abort install their own, and tests install a recording one.
#[derive(Clone)]
pub struct FatalHook {
    handler: Arc<dyn Fn(&Fault) + Send + Sync>,
}

impl FatalHook {
    pub fn new(handler: impl Fn(&Fault) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Report `fault` and terminate the hosting context.
    ///
    /// The panic payload is the fault itself, so catch points that convert
    /// panics into `TaskError` can recognize it and refuse to.
    pub fn raise(&self, fault: Fault) -> ! {
        (self.handler)(&fault);
        panic::panic_any(fault)
    }
}

impl Default for FatalHook {
    fn default() -> Self {
        Self::new(|fault| tracing::error!(%fault, "fatal fault"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn raise_invokes_handler_then_panics() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hook = {
            let seen = seen.clone();
            FatalHook::new(move |fault| seen.lock().unwrap().push(fault.clone()))
        };

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            hook.raise(Fault::LightOutOfRange { index: 9 });
        }));

        let payload = result.unwrap_err();
        assert!(matches!(
            payload.downcast_ref::<Fault>(),
            Some(Fault::LightOutOfRange { index: 9 })
        ));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn errors_display_their_cause() {
        let err = TaskError::Failed("boom".to_string());
        assert_eq!(err.to_string(), "task failed: boom");
        assert_eq!(
            Fault::Unobserved(err).to_string(),
            "unobserved failure in detached work: task failed: boom"
        );
    }
}
