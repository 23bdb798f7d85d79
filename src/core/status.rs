//! Poll status - a projection of the schedule, no storage access.

use crate::context::AppContext;
use chrono::{DateTime, Local};

/// Whether the poll has ended and when it ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollStatus {
    /// True from the end time on
    pub is_ended: bool,
    /// Configured end time in the local zone
    pub end_time: DateTime<Local>,
}

/// Current poll status.
#[must_use]
pub fn poll_status(ctx: &AppContext) -> PollStatus {
    let schedule = ctx.schedule();
    PollStatus {
        is_ended: !schedule.is_open(ctx.now()),
        end_time: schedule.ends_at_local(),
    }
}
