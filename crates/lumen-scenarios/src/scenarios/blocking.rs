// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Fully synchronous execution on the affinity thread.

use lumen_rt::timer;

use crate::context::Ctx;
use crate::panel::LIGHT_COUNT;

/// The whole run happens inside one drained job. The queue cannot advance,
/// so the lock and reset are never observable from outside and every light
/// appears at once when the job finally returns.
pub fn blocking_loop(ctx: Ctx) {
    ctx.panel.lock_ui(true);
    ctx.panel.reset();
    for index in 0..LIGHT_COUNT {
        timer::block_for(ctx.pace);
        ctx.panel.light_up(index);
    }
    ctx.panel.lock_ui(false);
}
