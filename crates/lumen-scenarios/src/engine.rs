// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scenario engine: owns the affinity thread and runs catalog entries.

use std::time::Duration;

use lumen_rt::affinity::{Affinity, AffinityThread};
use lumen_rt::dispatch::Dispatcher;
use lumen_rt::fault::FatalHook;
use thiserror::Error;
use tracing::info;

use crate::catalog::{self, Scenario};
use crate::context::Ctx;
use crate::panel::{Panel, PanelHooks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown scenario id {id}")]
    UnknownScenario { id: usize },
}

/// Owns the affinity thread and wires scenarios to the collaborator.
pub struct Engine {
    affinity_thread: AffinityThread,
    ctx: Ctx,
}

impl Engine {
    /// Start an engine over the collaborator's callbacks. `pace` is the
    /// duration of each scenario step's simulated slow work; `fatal`
    /// receives any contract violation or unobserved failure before the
    /// offending context dies.
    pub fn start(hooks: PanelHooks, pace: Duration, fatal: FatalHook) -> Self {
        let affinity_thread = AffinityThread::start(fatal.clone());
        let affinity = affinity_thread.handle();
        let ctx = Ctx {
            dispatcher: Dispatcher::new(fatal),
            panel: Panel::new(hooks, affinity.clone()),
            affinity,
            pace,
        };
        Self {
            affinity_thread,
            ctx,
        }
    }

    /// Posting handle to the engine's affinity thread.
    pub fn affinity(&self) -> Affinity {
        self.ctx.affinity.clone()
    }

    /// Run scenario `id`. Returns once the entry is posted; the scenario
    /// then completes, deadlocks, or crashes on its own, per its design.
    pub fn run(&self, id: usize) -> Result<&'static Scenario, EngineError> {
        let scenario = catalog::by_id(id).ok_or(EngineError::UnknownScenario { id })?;
        info!(id, name = scenario.name, "running scenario");
        let run = scenario.run;
        let ctx = self.ctx.clone();
        self.ctx.affinity.post(move || run(ctx));
        Ok(scenario)
    }

    /// Release the context and join the drain loop once queued work ends.
    /// Not for deadlocked runs; drop the engine instead, which detaches.
    pub fn shutdown(self) {
        let Self {
            affinity_thread,
            ctx,
        } = self;
        drop(ctx);
        affinity_thread.shutdown();
    }
}
