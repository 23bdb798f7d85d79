//! Ballot entity - the Ballot Store.
//!
//! Ballots are keyed by a random `ordering_key`. `SQLite` lays rows out by their
//! integer primary key, so the physical order of the table follows the random key
//! rather than the order in which votes arrived. There is no timestamp column.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Anonymous ballot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ballots")]
pub struct Model {
    /// Random decorrelation key
    #[sea_orm(primary_key, auto_increment = false)]
    pub ordering_key: i64,
    /// Canonical choice string (`"for"` or `"against"`)
    pub choice: String,
}

/// Ballots have no relationship with any other table
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
