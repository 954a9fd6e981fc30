// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scenario catalog: eighteen compositions of the runtime primitives that
//! keep one designated consumer thread responsive and consistent, or
//! demonstrably fail to.
//!
//! The embedding application supplies three callbacks (lock, reset, light)
//! and runs entries by id through the [`engine::Engine`]; each entry then
//! completes, deadlocks, or crashes on its own, per its design.

pub mod catalog;
pub mod context;
pub mod engine;
pub mod panel;
pub mod scenarios;
