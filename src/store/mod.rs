//! Storage collaborator for the voting core.
//!
//! The core only talks to these traits. A backend has to provide a point lookup by
//! apartment number, a conditional insert that reports "already exists", an append
//! for ballots, a grouped count over ballots, and units of work that apply all of
//! their writes at commit or none of them.

/// Process-local backend
pub mod memory;
/// `SQLite` backend through `SeaORM`
pub mod sea;

pub use memory::MemoryStore;
pub use sea::SeaOrmStore;

use crate::errors::StorageResult;
use crate::models::{ApartmentNumber, ApartmentRecord, BallotRecord};
use async_trait::async_trait;

/// Outcome of a point lookup. A missing record is a normal result, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The record exists
    Found(T),
    /// No record under that key
    NotFound,
}

impl<T> Lookup<T> {
    /// Converts into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Whether a record was found.
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Outcome of a conditional insert on the apartment key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written
    Inserted,
    /// A record with the same apartment number already exists
    AlreadyExists,
}

/// Raw per-value ballot count as stored. Values are classified by the tally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredCount {
    /// Stored choice string
    pub value: String,
    /// Number of ballots carrying it
    pub count: u64,
}

/// An atomic unit of work against the store.
///
/// Writes made through a unit become visible together at [`UnitOfWork::commit`].
/// [`UnitOfWork::abort`] discards them, and so does dropping the unit without
/// committing.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Reads the eligibility record for an apartment inside the unit.
    async fn find_apartment(
        &mut self,
        number: ApartmentNumber,
    ) -> StorageResult<Lookup<ApartmentRecord>>;

    /// Writes an eligibility record unless one already exists for the apartment.
    async fn insert_apartment(&mut self, record: &ApartmentRecord) -> StorageResult<InsertOutcome>;

    /// Appends an anonymous ballot.
    async fn append_ballot(&mut self, ballot: &BallotRecord) -> StorageResult<()>;

    /// Publishes every write of the unit. A concurrent winner on the same apartment
    /// surfaces as [`crate::errors::StorageError::Conflict`].
    async fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discards every write of the unit.
    async fn abort(self: Box<Self>) -> StorageResult<()>;
}

/// The Eligibility Store and Ballot Store behind one handle.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Opens a unit of work.
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>>;

    /// Reads the committed eligibility record for an apartment.
    async fn find_apartment(
        &self,
        number: ApartmentNumber,
    ) -> StorageResult<Lookup<ApartmentRecord>>;

    /// Counts committed ballots grouped by their stored value.
    async fn ballot_counts(&self) -> StorageResult<Vec<StoredCount>>;
}
