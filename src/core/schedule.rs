//! Clock and schedule gate.
//!
//! The poll end is configured as a naive wall-clock time in the process-local zone
//! and converted to a UTC instant exactly once. Every comparison afterwards is
//! between UTC instants, so no code path mixes zones.

use crate::errors::{Error, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Format of the configured poll end time.
pub const POLL_END_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Poll end used when nothing valid is configured.
pub const DEFAULT_POLL_END: &str = "2024-04-01 23:59:59";

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// When the poll closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSchedule {
    ends_at: DateTime<Utc>,
}

impl PollSchedule {
    /// Schedule closing at the given instant.
    #[must_use]
    pub const fn new(ends_at: DateTime<Utc>) -> Self {
        Self { ends_at }
    }

    /// Parses a local wall-clock time in [`POLL_END_FORMAT`].
    ///
    /// Times that do not exist locally (skipped by a DST change) are rejected;
    /// ambiguous ones resolve to the earlier instant.
    pub fn parse_local(raw: &str) -> Result<Self> {
        let naive = NaiveDateTime::parse_from_str(raw.trim(), POLL_END_FORMAT).map_err(|e| {
            Error::Config {
                message: format!("poll end time {raw:?} is not in {POLL_END_FORMAT} format: {e}"),
            }
        })?;

        let local = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| Error::Config {
                message: format!("poll end time {raw:?} does not exist in the local time zone"),
            })?;

        Ok(Self::new(local.with_timezone(&Utc)))
    }

    /// Parses `raw` when given and valid; otherwise falls back to [`DEFAULT_POLL_END`].
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            match Self::parse_local(raw) {
                Ok(schedule) => return schedule,
                Err(e) => tracing::warn!("Invalid poll end time, using default: {}", e),
            }
        }
        Self::default_end()
    }

    /// The built-in default schedule.
    #[must_use]
    pub fn default_end() -> Self {
        let naive = NaiveDateTime::parse_from_str(DEFAULT_POLL_END, POLL_END_FORMAT)
            .unwrap_or_default();
        // The default is a regular evening time; interpret as UTC if the zone skips it
        let ends_at = Local
            .from_local_datetime(&naive)
            .earliest()
            .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc));
        Self::new(ends_at)
    }

    /// The closing instant.
    #[must_use]
    pub const fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    /// The closing instant in the local zone, for display.
    #[must_use]
    pub fn ends_at_local(&self) -> DateTime<Local> {
        self.ends_at.with_timezone(&Local)
    }

    /// Whether the poll accepts checks and votes at `now`. Still open at exactly
    /// `ends_at`, closed from the next instant on.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.ends_at
    }

    /// Fails with [`Error::PollClosed`] once the poll is closed.
    pub fn ensure_open(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_open(now) {
            Ok(())
        } else {
            Err(Error::PollClosed)
        }
    }
}
