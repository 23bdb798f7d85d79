//! Process-local store.
//!
//! State lives behind a single mutex that is only held for short, non-async
//! critical sections. A unit of work buffers its writes and applies them at commit,
//! after re-checking the apartment key against what other units committed meanwhile.

use super::{InsertOutcome, Lookup, StoredCount, UnitOfWork, VoteStore};
use crate::{
    errors::{StorageError, StorageResult},
    models::{ApartmentNumber, ApartmentRecord, BallotRecord, Choice},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct MemoryState {
    apartments: HashMap<ApartmentNumber, ApartmentRecord>,
    // Keyed by ordering key, so iteration order is unrelated to arrival order
    ballots: BTreeMap<i64, Choice>,
}

type SharedState = Arc<Mutex<MemoryState>>;

fn lock(state: &SharedState) -> StorageResult<MutexGuard<'_, MemoryState>> {
    state
        .lock()
        .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
}

/// In-memory store. Cloning shares the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: SharedState,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed ballots.
    pub fn ballot_len(&self) -> StorageResult<usize> {
        Ok(lock(&self.state)?.ballots.len())
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnit {
            state: Arc::clone(&self.state),
            apartments: Vec::new(),
            ballots: Vec::new(),
        }))
    }

    #[instrument(skip(self))]
    async fn find_apartment(
        &self,
        number: ApartmentNumber,
    ) -> StorageResult<Lookup<ApartmentRecord>> {
        Ok(lock(&self.state)?.apartments.get(&number).cloned().into())
    }

    #[instrument(skip(self))]
    async fn ballot_counts(&self) -> StorageResult<Vec<StoredCount>> {
        let state = lock(&self.state)?;
        let mut counts: HashMap<Choice, u64> = HashMap::new();
        for choice in state.ballots.values() {
            *counts.entry(*choice).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(choice, count)| StoredCount {
                value: choice.as_str().to_string(),
                count,
            })
            .collect())
    }
}

/// Buffered unit of work over a [`MemoryStore`].
pub struct MemoryUnit {
    state: SharedState,
    apartments: Vec<ApartmentRecord>,
    ballots: Vec<BallotRecord>,
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn find_apartment(
        &mut self,
        number: ApartmentNumber,
    ) -> StorageResult<Lookup<ApartmentRecord>> {
        if let Some(pending) = self.apartments.iter().find(|r| r.number == number) {
            return Ok(Lookup::Found(pending.clone()));
        }
        Ok(lock(&self.state)?.apartments.get(&number).cloned().into())
    }

    async fn insert_apartment(&mut self, record: &ApartmentRecord) -> StorageResult<InsertOutcome> {
        if self.find_apartment(record.number).await?.is_found() {
            return Ok(InsertOutcome::AlreadyExists);
        }
        self.apartments.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn append_ballot(&mut self, ballot: &BallotRecord) -> StorageResult<()> {
        self.ballots.push(*ballot);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let mut state = lock(&self.state)?;

        // Validate everything before touching anything
        for record in &self.apartments {
            if state.apartments.contains_key(&record.number) {
                return Err(StorageError::Conflict(format!(
                    "apartment {} committed concurrently",
                    record.number
                )));
            }
        }
        for ballot in &self.ballots {
            if state.ballots.contains_key(&ballot.ordering_key) {
                return Err(StorageError::Conflict(
                    "ballot ordering key already in use".to_string(),
                ));
            }
        }

        for record in &self.apartments {
            state.apartments.insert(record.number, record.clone());
        }
        for ballot in &self.ballots {
            state.ballots.insert(ballot.ordering_key, ballot.choice);
        }

        debug!(
            apartments = self.apartments.len(),
            ballots = self.ballots.len(),
            "Committed memory unit."
        );
        Ok(())
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}
