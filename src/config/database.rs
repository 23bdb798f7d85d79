//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Creation is idempotent so the service
//! can restart against an existing database file.

use crate::entities::{Apartment, Ballot};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{info, instrument};

/// Database used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/building_vote.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }

    Database::connect(database_url).await.map_err(Into::into)
}

/// Directory that must exist before `SQLite` can create the file behind `database_url`.
fn sqlite_parent_dir(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates the apartments and ballots tables if they do not exist yet.
///
/// The two tables share no foreign key; the ballots table has no timestamp column.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut apartment_table = schema.create_table_from_entity(Apartment);
    let mut ballot_table = schema.create_table_from_entity(Ballot);

    apartment_table.if_not_exists();
    ballot_table.if_not_exists();

    db.execute(builder.build(&apartment_table)).await?;
    db.execute(builder.build(&ballot_table)).await?;

    info!("Database tables ensured.");
    Ok(())
}
