// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Background work with varying degrees of marshaling back to the
//! affinity thread.
//!
//! All four entries unblock the caller immediately; they differ in whether
//! the worker's results travel through the affinity channel, what each
//! posted closure captures, and where the final unlock runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lumen_rt::timer;

use crate::context::Ctx;
use crate::panel::LIGHT_COUNT;

/// The worker calls the panel directly. The first light call trips the
/// affinity guard and kills the worker; the unlock below has already fired
/// by then, long before the work could have finished.
pub fn background_direct(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    let panel = ctx.panel.clone();
    let pace = ctx.pace;
    ctx.dispatcher.run_detached(move || {
        for index in 0..LIGHT_COUNT {
            timer::block_for(pace);
            panel.light_up(index);
        }
        Ok(())
    });
    ctx.panel.lock_ui(false);
}

/// Each light is marshaled through the channel, but every posted closure
/// reads the same slot. A closure drained after the loop has moved on
/// lights whatever the slot holds by then, not the index it was posted for.
pub fn background_post_shared(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    let affinity = ctx.affinity.clone();
    let panel = ctx.panel.clone();
    let pace = ctx.pace;
    ctx.dispatcher.run_detached(move || {
        let slot = Arc::new(AtomicUsize::new(0));
        for index in 0..LIGHT_COUNT {
            timer::block_for(pace);
            slot.store(index, Ordering::Relaxed);
            let slot = Arc::clone(&slot);
            let panel = panel.clone();
            affinity.post(move || panel.light_up(slot.load(Ordering::Relaxed)));
        }
        Ok(())
    });
    ctx.panel.lock_ui(false);
}

/// Same marshaling, but each closure captures its own copy of the index,
/// so a late drain cannot corrupt it. The unlock still fires before the
/// work is anywhere near done.
pub fn background_post_fresh(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    let affinity = ctx.affinity.clone();
    let panel = ctx.panel.clone();
    let pace = ctx.pace;
    ctx.dispatcher.run_detached(move || {
        for index in 0..LIGHT_COUNT {
            timer::block_for(pace);
            let panel = panel.clone();
            affinity.post(move || panel.light_up(index));
        }
        Ok(())
    });
    ctx.panel.lock_ui(false);
}

/// As `background_post_fresh`, with the unlock itself posted behind the
/// last light. Per-sender FIFO puts it after every light; nothing fires
/// early any more.
pub fn background_post_handoff(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    let affinity = ctx.affinity.clone();
    let panel = ctx.panel.clone();
    let pace = ctx.pace;
    ctx.dispatcher.run_detached(move || {
        for index in 0..LIGHT_COUNT {
            timer::block_for(pace);
            let panel = panel.clone();
            affinity.post(move || panel.light_up(index));
        }
        affinity.post(move || panel.lock_ui(false));
        Ok(())
    });
}
