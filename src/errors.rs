//! Unified error types for the voting service.
//!
//! Business-rule and validation failures are distinct variants so the API layer can
//! map them to client errors; everything coming out of the storage collaborator is
//! funnelled through [`StorageError`].

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Top-level error for every core operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation was attempted at or after the configured poll end.
    #[error("poll closed")]
    PollClosed,

    /// The apartment already has an eligibility record.
    #[error("already voted")]
    AlreadyVoted {
        /// Apartment that tried to vote twice
        apartment: i64,
    },

    /// Malformed request data (apartment number, voter name, body shape).
    #[error("{message}")]
    InvalidInput {
        /// Human-readable reason
        message: String,
    },

    /// The submitted vote value is not one of the known choices.
    #[error("invalid choice: {value}")]
    InvalidChoice {
        /// The rejected raw value
        value: String,
    },

    /// Backing store failure or an unresolved write race.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Startup configuration problem.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// I/O failure (config file, listener bind).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`] with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error is caused by the caller rather than the service.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::PollClosed
                | Self::AlreadyVoted { .. }
                | Self::InvalidInput { .. }
                | Self::InvalidChoice { .. }
        )
    }
}

/// Failures reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A concurrent writer won a race on the same key, or the store refused the
    /// write because of lock contention.
    #[error("storage conflict: {0}")]
    Conflict(String),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return Self::Conflict(err.to_string());
        }

        let text = err.to_string();
        if text.contains("database is locked") || text.contains("database table is locked") {
            Self::Conflict(text)
        } else {
            Self::Unavailable(text)
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        Self::Storage(err.into())
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Result type used by storage backends
pub type StorageResult<T> = std::result::Result<T, StorageError>;
