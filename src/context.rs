//! Application context shared by every handler.

use crate::core::schedule::{Clock, PollSchedule, SystemClock};
use crate::store::VoteStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Everything an operation needs: the store, the schedule, and the time source.
///
/// Built once at startup and handed to handlers by parameter; cloning is cheap.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn VoteStore>,
    schedule: PollSchedule,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Context on the wall clock.
    #[must_use]
    pub fn new(store: Arc<dyn VoteStore>, schedule: PollSchedule) -> Self {
        Self::with_clock(store, schedule, Arc::new(SystemClock))
    }

    /// Context with an explicit time source.
    #[must_use]
    pub fn with_clock(
        store: Arc<dyn VoteStore>,
        schedule: PollSchedule,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            schedule,
            clock,
        }
    }

    /// The vote store.
    #[must_use]
    pub fn store(&self) -> &dyn VoteStore {
        self.store.as_ref()
    }

    /// The poll schedule.
    #[must_use]
    pub const fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Current instant from the configured clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}
