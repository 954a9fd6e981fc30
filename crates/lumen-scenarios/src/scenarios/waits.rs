// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Forced synchronous waits on asynchronous work.

use lumen_rt::timer;

use crate::context::Ctx;
use crate::panel::LIGHT_COUNT;

/// Blocking wait on work whose polls can only run on the thread doing the
/// waiting. The spawned task's first poll sits in the queue behind this
/// very job; the wait never returns and nothing ever lights.
pub fn wait_deadlock(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    let c = ctx.clone();
    let work = ctx.affinity.spawn(async move {
        for index in 0..LIGHT_COUNT {
            timer::delay(c.pace).await?;
            c.panel.light_up(index);
        }
        Ok(())
    });
    let _ = work.wait();
    ctx.panel.lock_ui(false);
}

/// Blocking wait on work driven by a worker instead. The wait returns,
/// but it froze the affinity thread for every step: the lock was pointless
/// because nothing could have repainted anyway.
pub fn wait_detached(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    for index in 0..LIGHT_COUNT {
        let pace = ctx.pace;
        let step = ctx
            .dispatcher
            .run_async(async move { timer::delay(pace).await });
        let _ = step.wait();
        ctx.panel.light_up(index);
    }
    ctx.panel.lock_ui(false);
}
