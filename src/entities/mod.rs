//! Entity module - `SeaORM` definitions for the two voting tables.
//! The apartments table and the ballots table share no key and no relation.

pub mod apartment;
pub mod ballot;

pub use apartment::{Column as ApartmentColumn, Entity as Apartment, Model as ApartmentModel};
pub use ballot::{Column as BallotColumn, Entity as Ballot, Model as BallotModel};
