//! `SeaORM` backed store.
//!
//! Each unit of work is a `DatabaseTransaction`; `SeaORM` rolls it back when it is
//! dropped without a commit. The apartment primary key is the uniqueness constraint
//! that settles racing first votes.

use super::{InsertOutcome, Lookup, StoredCount, UnitOfWork, VoteStore};
use crate::{
    entities::{Apartment, Ballot, apartment, ballot},
    errors::{StorageError, StorageResult},
    models::{ApartmentNumber, ApartmentRecord, BallotRecord},
};
use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, instrument};

/// Store over a `SeaORM` connection.
#[derive(Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Wraps an open connection. Tables must already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn to_record(model: apartment::Model) -> StorageResult<ApartmentRecord> {
    let number = ApartmentNumber::new(model.number).map_err(|e| {
        StorageError::Unavailable(format!("corrupt apartment row {}: {e}", model.number))
    })?;

    Ok(ApartmentRecord {
        number,
        voter_name: model.voter_name,
        voted_at: model.voted_at,
    })
}

async fn find_apartment_on<C>(db: &C, number: ApartmentNumber) -> StorageResult<Lookup<ApartmentRecord>>
where
    C: ConnectionTrait,
{
    match Apartment::find_by_id(number.get()).one(db).await? {
        Some(model) => Ok(Lookup::Found(to_record(model)?)),
        None => Ok(Lookup::NotFound),
    }
}

#[async_trait]
impl VoteStore for SeaOrmStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        let txn = self.db.begin().await?;
        Ok(Box::new(SeaOrmUnit { txn }))
    }

    #[instrument(skip(self))]
    async fn find_apartment(
        &self,
        number: ApartmentNumber,
    ) -> StorageResult<Lookup<ApartmentRecord>> {
        find_apartment_on(&self.db, number).await
    }

    #[instrument(skip(self))]
    async fn ballot_counts(&self) -> StorageResult<Vec<StoredCount>> {
        let rows: Vec<(String, i64)> = Ballot::find()
            .select_only()
            .column(ballot::Column::Choice)
            .column_as(Expr::col(ballot::Column::OrderingKey).count(), "votes")
            .group_by(ballot::Column::Choice)
            .into_tuple()
            .all(&self.db)
            .await?;

        debug!("Fetched {} ballot groups.", rows.len());
        rows.into_iter()
            .map(|(value, count)| {
                let count = u64::try_from(count).map_err(|_| {
                    StorageError::Unavailable(format!("negative ballot count for {value:?}"))
                })?;
                Ok(StoredCount { value, count })
            })
            .collect()
    }
}

/// Unit of work over one database transaction.
pub struct SeaOrmUnit {
    txn: DatabaseTransaction,
}

#[async_trait]
impl UnitOfWork for SeaOrmUnit {
    #[instrument(skip(self))]
    async fn find_apartment(
        &mut self,
        number: ApartmentNumber,
    ) -> StorageResult<Lookup<ApartmentRecord>> {
        find_apartment_on(&self.txn, number).await
    }

    #[instrument(skip(self, record), fields(apartment = record.number.get()))]
    async fn insert_apartment(&mut self, record: &ApartmentRecord) -> StorageResult<InsertOutcome> {
        let model = apartment::ActiveModel {
            number: Set(record.number.get()),
            voter_name: Set(record.voter_name.clone()),
            voted_at: Set(record.voted_at),
        };

        let written = Apartment::insert(model)
            .on_conflict(
                OnConflict::column(apartment::Column::Number)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await?;

        if written == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    #[instrument(skip_all)]
    async fn append_ballot(&mut self, ballot: &BallotRecord) -> StorageResult<()> {
        let model = ballot::ActiveModel {
            ordering_key: Set(ballot.ordering_key),
            choice: Set(ballot.choice.as_str().to_string()),
        };

        Ballot::insert(model)
            .exec_without_returning(&self.txn)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        self.txn.commit().await.map_err(Into::into)
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        self.txn.rollback().await.map_err(Into::into)
    }
}
