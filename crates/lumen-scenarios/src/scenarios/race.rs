// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Racing independent delays and reacting in completion order.
//!
//! All three entries start one racer per light and retire them through
//! `first_of` as they settle. They differ only in how a racer knows which
//! light is its own.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lumen_rt::select::{first_of, PendingSet};
use lumen_rt::timer;

use crate::context::Ctx;
use crate::panel::LIGHT_COUNT;

/// Each racer resolves to its own index; whichever settles first lights
/// first. The order varies run to run, but every index lights exactly once.
pub fn race_completion_order(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        let mut pending = PendingSet::new();
        for index in 0..LIGHT_COUNT {
            let pace = c.pace;
            pending.push(c.affinity.spawn(async move {
                timer::delay(pace).await?;
                Ok(index)
            }));
        }
        while !pending.is_empty() {
            let (_settled, result) = first_of(&mut pending).await?;
            c.panel.light_up(result?);
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// Every racer's continuation reads the same slot. The spawn loop has
/// driven the slot to its final value before any racer gets polled, so the
/// indices that light are stale.
pub fn race_shared_slot(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        let slot = Arc::new(AtomicUsize::new(0));
        let mut pending = PendingSet::new();
        for index in 0..LIGHT_COUNT {
            slot.store(index, Ordering::Relaxed);
            let slot = Arc::clone(&slot);
            let panel = c.panel.clone();
            let pace = c.pace;
            pending.push(c.affinity.spawn(async move {
                timer::delay(pace).await?;
                panel.light_up(slot.load(Ordering::Relaxed));
                Ok(())
            }));
        }
        while !pending.is_empty() {
            first_of(&mut pending).await?;
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}

/// Same race, but each continuation captures the index it was started
/// with. Completion order cannot corrupt the mapping.
pub fn race_fresh_index(ctx: Ctx) {
    let c = ctx.clone();
    ctx.affinity.spawn_detached(async move {
        c.panel.lock_ui(true);
        c.panel.reset();
        let mut pending = PendingSet::new();
        for index in 0..LIGHT_COUNT {
            let panel = c.panel.clone();
            let pace = c.pace;
            pending.push(c.affinity.spawn(async move {
                timer::delay(pace).await?;
                panel.light_up(index);
                Ok(())
            }));
        }
        while !pending.is_empty() {
            first_of(&mut pending).await?;
        }
        c.panel.lock_ui(false);
        Ok(())
    });
}
