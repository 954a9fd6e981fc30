// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! lumen runtime library.
//!
//! Concurrency primitives for the scenario catalog. One dedicated
//! "affinity" thread drains a FIFO job queue and doubles as a cooperative
//! executor; everything else runs on plain OS worker threads.
//!
//! Components:
//! - `promise`  — settle-once value/failure cell, awaitable or waitable
//! - `task`     — type-erased cooperative task + `block_on` driver
//! - `affinity` — single-consumer job queue bound to one thread
//! - `dispatch` — background work on worker threads
//! - `timer`    — suspending delay and deliberate blocking sleep
//! - `select`   — completion-order combinator over pending promises
//! - `fault`    — failure taxonomy and the fatal escalation path

pub mod affinity;
pub mod dispatch;
pub mod fault;
pub mod promise;
pub mod select;
pub mod task;
pub mod timer;
