// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Per-run context handed to every scenario procedure.

use std::time::Duration;

use lumen_rt::affinity::Affinity;
use lumen_rt::dispatch::Dispatcher;

use crate::panel::Panel;

/// Everything a scenario needs: the affinity handle, the background
/// dispatcher, the guarded panel, and the pace of its simulated slow work.
#[derive(Clone)]
pub struct Ctx {
    pub affinity: Affinity,
    pub dispatcher: Dispatcher,
    pub panel: Panel,
    pub pace: Duration,
}
