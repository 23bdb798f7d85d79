//! The voting transaction.
//!
//! One successful call writes exactly one eligibility record and exactly one ballot,
//! inside a single unit of work. The ballot carries no reference to the apartment,
//! and nothing logged here names the choice together with the apartment or voter.

use crate::{
    context::AppContext,
    errors::{Error, Result, StorageError},
    models::{ApartmentNumber, ApartmentRecord, BallotRecord, Choice, VoterName},
    store::{InsertOutcome, Lookup, UnitOfWork, VoteStore},
};
use tracing::{info, instrument, warn};

/// Attempts made before an unresolved storage conflict is reported.
pub const MAX_ATTEMPTS: u32 = 3;

/// Casts the vote of `apartment`.
///
/// Checks run in order: poll open, apartment number, voter name, choice. On a
/// storage conflict the unit is aborted and eligibility re-read: if the apartment
/// now has a record, the caller lost a race and gets [`Error::AlreadyVoted`];
/// otherwise the attempt is repeated with a fresh decorrelation key.
#[instrument(skip(ctx, voter_name, choice))]
pub async fn submit_vote(
    ctx: &AppContext,
    apartment: i64,
    voter_name: &str,
    choice: &str,
) -> Result<()> {
    let now = ctx.now();
    ctx.schedule().ensure_open(now)?;

    let number = ApartmentNumber::new(apartment)?;
    let voter_name = VoterName::new(voter_name)?;
    let choice: Choice = choice.parse()?;

    let record = ApartmentRecord {
        number,
        voter_name: voter_name.into_inner(),
        voted_at: now,
    };

    let store = ctx.store();
    let mut last_conflict = String::new();
    for attempt in 1..=MAX_ATTEMPTS {
        match cast_once(store, &record, choice).await {
            Ok(()) => {
                info!("Vote recorded for apartment {}.", number);
                return Ok(());
            }
            Err(Error::Storage(StorageError::Conflict(detail))) => {
                warn!(attempt, "Storage conflict while voting: {}", detail);
                if store.find_apartment(number).await?.is_found() {
                    return Err(Error::AlreadyVoted {
                        apartment: number.get(),
                    });
                }
                last_conflict = detail;
            }
            Err(e) => return Err(e),
        }
    }

    Err(StorageError::Conflict(last_conflict).into())
}

/// Runs one unit of work to completion. The unit is committed on success and
/// aborted on every failure path.
async fn cast_once(store: &dyn VoteStore, record: &ApartmentRecord, choice: Choice) -> Result<()> {
    let mut unit = store.begin().await?;

    let written = write_vote(unit.as_mut(), record, choice).await;
    match written {
        Ok(()) => Ok(unit.commit().await?),
        Err(e) => {
            if let Err(abort_err) = unit.abort().await {
                warn!("Failed to abort voting unit: {}", abort_err);
            }
            Err(e)
        }
    }
}

async fn write_vote(
    unit: &mut dyn UnitOfWork,
    record: &ApartmentRecord,
    choice: Choice,
) -> Result<()> {
    let already_voted = Error::AlreadyVoted {
        apartment: record.number.get(),
    };

    if let Lookup::Found(_) = unit.find_apartment(record.number).await? {
        return Err(already_voted);
    }

    match unit.insert_apartment(record).await? {
        InsertOutcome::Inserted => {}
        InsertOutcome::AlreadyExists => return Err(already_voted),
    }

    unit.append_ballot(&BallotRecord::new(choice)).await?;
    Ok(())
}
