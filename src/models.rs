//! Validated domain values shared by the core, the stores, and the API.
//!
//! Raw request data is parsed into these types at the boundary; nothing past the
//! boundary deals with unchecked strings or integers.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Longest voter name accepted, in characters.
pub const MAX_VOTER_NAME_CHARS: usize = 100;

/// An apartment number. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ApartmentNumber(i64);

impl ApartmentNumber {
    /// Validates a raw apartment number.
    pub fn new(raw: i64) -> Result<Self> {
        if raw <= 0 {
            return Err(Error::invalid_input(
                "apartment number must be a positive integer",
            ));
        }
        Ok(Self(raw))
    }

    /// Parses an apartment number from a path segment or form value.
    pub fn parse(raw: &str) -> Result<Self> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::invalid_input("apartment number must be a positive integer"))?;
        Self::new(value)
    }

    /// The underlying integer.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ApartmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name of whoever cast the vote for an apartment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoterName(String);

impl VoterName {
    /// Trims and validates a voter name.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_input("voter name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_VOTER_NAME_CHARS {
            return Err(Error::invalid_input(format!(
                "voter name cannot be longer than {MAX_VOTER_NAME_CHARS} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrowed view of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// The closed set of vote values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// In favour of the proposal
    For,
    /// Against the proposal
    Against,
}

impl Choice {
    /// Every variant, in bucket order. The tally reports one counter per entry.
    pub const ALL: [Self; 2] = [Self::For, Self::Against];

    /// Canonical stored form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Against => "against",
        }
    }

    /// Position of this variant in [`Choice::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::For => 0,
            Self::Against => 1,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("for") || value == "בעד" {
            Ok(Self::For)
        } else if value.eq_ignore_ascii_case("against") || value == "נגד" {
            Ok(Self::Against)
        } else {
            Err(Error::InvalidChoice {
                value: raw.to_string(),
            })
        }
    }
}

/// Durable proof that an apartment has used its vote. Carries nothing about the choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApartmentRecord {
    /// Natural key
    pub number: ApartmentNumber,
    /// Who voted on behalf of the apartment
    pub voter_name: String,
    /// When eligibility was consumed
    pub voted_at: DateTime<Utc>,
}

/// An anonymous ballot. Nothing in it refers to an apartment or a voter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallotRecord {
    /// The vote value
    pub choice: Choice,
    /// Random decorrelation key; never derived from time or identity
    pub ordering_key: i64,
}

impl BallotRecord {
    /// Creates a ballot with a fresh random decorrelation key.
    #[must_use]
    pub fn new(choice: Choice) -> Self {
        Self {
            choice,
            ordering_key: rand::random(),
        }
    }
}
