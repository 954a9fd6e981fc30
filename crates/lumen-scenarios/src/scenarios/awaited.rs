// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Cooperative suspension: the affinity thread stays responsive between
//! steps because every await yields back to the drain loop.

use lumen_rt::fault::TaskError;
use lumen_rt::timer;

use crate::context::Ctx;
use crate::panel::LIGHT_COUNT;

/// Await a delay per step, resuming on the affinity thread each time.
pub fn awaited_sequential(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        for index in 0..LIGHT_COUNT {
            timer::delay(c.pace).await?;
            c.panel.light_up(index);
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// One step, delegated to a helper with its own suspension point.
async fn light_after_delay(ctx: &Ctx, index: usize) -> Result<(), TaskError> {
    timer::delay(ctx.pace).await?;
    ctx.panel.light_up(index);
    Ok(())
}

/// As `awaited_sequential`, but each step goes through a nested
/// asynchronous helper. Suspending two levels down changes nothing.
pub fn nested_helper(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        for index in 0..LIGHT_COUNT {
            light_after_delay(&c, index).await?;
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// The slow work truly blocks, but on a worker via the dispatcher; the
/// affinity task only suspends while awaiting it.
pub fn background_awaited(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        for index in 0..LIGHT_COUNT {
            let pace = c.pace;
            c.dispatcher
                .run(move || {
                    timer::block_for(pace);
                    Ok(())
                })
                .await?;
            c.panel.light_up(index);
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// The background work itself suspends before finishing; the worker drives
/// that inner suspension, and the affinity task still only awaits.
pub fn background_nested_suspend(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        for index in 0..LIGHT_COUNT {
            let pace = c.pace;
            c.dispatcher
                .run_async(async move { timer::delay(pace).await })
                .await?;
            c.panel.light_up(index);
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}
