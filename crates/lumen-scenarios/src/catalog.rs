// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The scenario registry.

use crate::context::Ctx;
use crate::scenarios::{awaited, background, blocking, failures, race, waits};

/// One catalog entry.
#[derive(Debug)]
pub struct Scenario {
    pub id: usize,
    pub name: &'static str,
    pub summary: &'static str,
    pub run: fn(Ctx),
}

/// All eighteen entries, in id order.
pub static SCENARIOS: [Scenario; 18] = [
    Scenario {
        id: 1,
        name: "blocking-loop",
        summary: "sleep on the affinity thread; everything appears at once at the end",
        run: blocking::blocking_loop,
    },
    Scenario {
        id: 2,
        name: "background-direct",
        summary: "worker calls the panel directly and dies on the affinity guard",
        run: background::background_direct,
    },
    Scenario {
        id: 3,
        name: "background-post-shared",
        summary: "posted closures share one index slot; late drains light the wrong index",
        run: background::background_post_shared,
    },
    Scenario {
        id: 4,
        name: "background-post-fresh",
        summary: "posted closures capture their own index; unlock still fires early",
        run: background::background_post_fresh,
    },
    Scenario {
        id: 5,
        name: "background-post-handoff",
        summary: "lights and the final unlock all ride the channel, in order",
        run: background::background_post_handoff,
    },
    Scenario {
        id: 6,
        name: "awaited-sequential",
        summary: "await a delay per step; the consumer stays responsive throughout",
        run: awaited::awaited_sequential,
    },
    Scenario {
        id: 7,
        name: "race-completion-order",
        summary: "three delays raced; lights follow completion order, any permutation",
        run: race::race_completion_order,
    },
    Scenario {
        id: 8,
        name: "race-shared-slot",
        summary: "racer continuations read a shared slot and light stale indices",
        run: race::race_shared_slot,
    },
    Scenario {
        id: 9,
        name: "race-fresh-index",
        summary: "racer continuations capture their own index; order-proof",
        run: race::race_fresh_index,
    },
    Scenario {
        id: 10,
        name: "nested-helper",
        summary: "each step delegates to an async helper with its own suspension",
        run: awaited::nested_helper,
    },
    Scenario {
        id: 11,
        name: "wait-deadlock",
        summary: "blocking wait for a continuation that needs the blocked thread; hangs",
        run: waits::wait_deadlock,
    },
    Scenario {
        id: 12,
        name: "wait-detached",
        summary: "blocking wait on worker-driven work; completes but freezes the consumer",
        run: waits::wait_detached,
    },
    Scenario {
        id: 13,
        name: "background-awaited",
        summary: "blocking work on a worker, awaited cooperatively",
        run: awaited::background_awaited,
    },
    Scenario {
        id: 14,
        name: "background-nested-suspend",
        summary: "worker-driven work that itself suspends, awaited cooperatively",
        run: awaited::background_nested_suspend,
    },
    Scenario {
        id: 15,
        name: "detached-failure",
        summary: "fire-and-forget failure after an await; unobserved and fatal",
        run: failures::detached_failure,
    },
    Scenario {
        id: 16,
        name: "wait-failure-caught",
        summary: "the same failure behind a blocking wait; caught at the call site",
        run: failures::wait_failure_caught,
    },
    Scenario {
        id: 17,
        name: "awaited-failure-caught",
        summary: "the same failure awaited cooperatively; caught like any result",
        run: failures::awaited_failure_caught,
    },
    Scenario {
        id: 18,
        name: "detached-failure-contained",
        summary: "fire-and-forget that handles its own failure; nothing escapes",
        run: failures::detached_failure_contained,
    },
];

/// Look up a scenario by its 1-based id.
pub fn by_id(id: usize) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.id == id)
}
