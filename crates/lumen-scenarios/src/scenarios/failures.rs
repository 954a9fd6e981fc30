// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! How raised failures travel, and where they stop.
//!
//! The same failing helper backs all four entries; what differs is who, if
//! anyone, is positioned to observe the failure.

use std::time::Duration;

use lumen_rt::fault::TaskError;
use lumen_rt::timer;

use crate::context::Ctx;

/// Simulated work that fails after its suspension point.
async fn failing_after_delay(pace: Duration) -> Result<(), TaskError> {
    timer::delay(pace).await?;
    Err(TaskError::Failed("simulated failure".to_string()))
}

/// Fire-and-forget: the failure surfaces after the await, inside a task
/// nobody observes. It escalates and takes the drain loop down; everything
/// after the failing await is lost.
pub fn detached_failure(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        c.panel.light_up(0);
        failing_after_delay(c.pace).await?;
        c.panel.light_up(1);
        c.panel.light_up(2);
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// The same failure behind a blocking wait on worker-driven work: it comes
/// back as an error value, catchable right here at the call site. Light 2
/// is the caught-failure indicator and fires before the others.
pub fn wait_failure_caught(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    let pace = ctx.pace;
    let doomed = ctx
        .dispatcher
        .run_async(async move { failing_after_delay(pace).await });
    if doomed.wait().is_err() {
        ctx.panel.light_up(2);
    }
    ctx.panel.light_up(0);
    ctx.panel.light_up(1);
    ctx.panel.lock_ui(false);
}

/// Cooperative await of the failing helper: the failure propagates to the
/// caller like any other result and is handled in place, with the affinity
/// thread responsive throughout.
pub fn awaited_failure_caught(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        if failing_after_delay(c.pace).await.is_err() {
            c.panel.light_up(2);
        }
        c.panel.light_up(0);
        c.panel.light_up(1);
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// Fire-and-forget that cleans up after itself: the failure is consumed
/// inside the detached task, so nothing is left to escalate.
pub fn detached_failure_contained(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        c.panel.light_up(0);
        c.panel.light_up(1);
        if failing_after_delay(c.pace).await.is_err() {
            c.panel.light_up(2);
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}
