// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The eighteen scenario procedures, grouped by the axis they vary:
//! blocking vs background execution, how results are marshaled back to the
//! affinity thread, and how raised failures travel.
//!
//! The broken variants are broken on purpose. Their bugs are structural
//! (a shared slot where a per-iteration copy belongs, a direct call where
//! a post belongs, a blocking wait where an await belongs) so the fix in
//! the neighboring entry is visible in the diff between them.

pub mod awaited;
pub mod background;
pub mod blocking;
pub mod failures;
pub mod race;
pub mod waits;
