//! Shared test utilities.
//!
//! This module provides common helpers for setting up stores, contexts pinned to a
//! manual clock, and records with sensible defaults.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    config::database::{create_connection, create_tables},
    context::AppContext,
    core::schedule::{Clock, POLL_END_FORMAT, PollSchedule},
    errors::Result,
    models::{ApartmentNumber, ApartmentRecord},
    store::{MemoryStore, SeaOrmStore, VoteStore},
};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::TempDir;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock stopped at `now`.
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates an in-memory `SQLite` store with all tables initialized.
///
/// The pool is pinned to one connection: every `sqlite::memory:` connection is a
/// separate database.
pub async fn setup_test_store() -> Result<SeaOrmStore> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    create_tables(&db).await?;
    Ok(SeaOrmStore::new(db))
}

/// Creates a file-backed `SQLite` store with the default connection pool, so
/// concurrent units really run on separate connections.
///
/// The returned directory owns the database file; keep it alive for the test.
pub async fn setup_file_store() -> Result<(SeaOrmStore, TempDir)> {
    let dir = TempDir::new()?;
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("votes.sqlite").display()
    );
    let db = create_connection(&url).await?;
    create_tables(&db).await?;
    Ok((SeaOrmStore::new(db), dir))
}

/// A fresh in-memory store.
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Converts a local wall-clock time in `YYYY-MM-DD HH:MM:SS` to an instant.
pub fn local_instant(raw: &str) -> DateTime<Utc> {
    let naive = NaiveDateTime::parse_from_str(raw, POLL_END_FORMAT).unwrap();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("test time exists locally")
        .with_timezone(&Utc)
}

/// Builds a context over `store` with a poll ending a week from now and the
/// clock stopped at the current instant.
pub fn open_poll_context<S>(store: Arc<S>) -> (AppContext, Arc<ManualClock>)
where
    S: VoteStore + 'static,
{
    let now = Utc::now();
    let schedule = PollSchedule::new(now + Duration::days(7));
    context_at(store, schedule, now)
}

/// Context for the published scenario: poll ends `2024-04-01 23:59:59` local time,
/// clock stopped one month earlier.
pub fn scenario_context<S>(store: Arc<S>) -> (AppContext, Arc<ManualClock>)
where
    S: VoteStore + 'static,
{
    let schedule = PollSchedule::parse_local("2024-04-01 23:59:59").unwrap();
    context_at(store, schedule, local_instant("2024-03-01 10:00:00"))
}

fn context_at<S>(
    store: Arc<S>,
    schedule: PollSchedule,
    now: DateTime<Utc>,
) -> (AppContext, Arc<ManualClock>)
where
    S: VoteStore + 'static,
{
    let clock = Arc::new(ManualClock::new(now));
    let ctx = AppContext::with_clock(store, schedule, Arc::clone(&clock) as _);
    (ctx, clock)
}

/// An eligibility record voted now.
pub fn apartment_record(number: i64, voter_name: &str) -> ApartmentRecord {
    ApartmentRecord {
        number: ApartmentNumber::new(number).unwrap(),
        voter_name: voter_name.to_string(),
        voted_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.set(start + Duration::hours(1));
        assert_eq!(clock.now(), start + Duration::hours(1));
    }
}
