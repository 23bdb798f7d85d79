//! Apartment entity - the Eligibility Store.
//!
//! One row per apartment that has voted. The row records who voted and when,
//! never what they voted for.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Apartment eligibility database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apartments")]
pub struct Model {
    /// Apartment number, the natural key
    #[sea_orm(primary_key, auto_increment = false)]
    pub number: i64,
    /// Display name of whoever voted for the apartment
    pub voter_name: String,
    /// When the apartment's eligibility was consumed
    pub voted_at: DateTimeUtc,
}

/// Apartments are deliberately unrelated to ballots
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
