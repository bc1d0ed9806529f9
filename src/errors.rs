//! Unified error types and result handling.
//!
//! Gateways surface domain-shaped errors (`NotFound`, `Conflict`, `Validation`).
//! Everything else coming out of the persistence layer is either classified
//! (`ResourceExhausted`) or carried as-is in `Database`.

use sea_orm::{ConnAcquireErr, DbErr, SqlErr};
use thiserror::Error;

/// Errors produced by the habit tracker core.
#[derive(Debug, Error)]
pub enum Error {
    /// A point lookup by unique key found no row.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record that was looked up (e.g. `"user"`, `"habit"`)
        entity: &'static str,
        /// The key that was used for the lookup
        key: String,
    },

    /// A create would violate a uniqueness invariant.
    #[error("Conflict: {message}")]
    Conflict {
        /// Which invariant was violated
        message: String,
    },

    /// Input rejected before touching storage.
    #[error("Invalid input: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The connection pool stayed saturated past its acquire timeout.
    #[error("Connection pool exhausted: {message}")]
    ResourceExhausted {
        /// Underlying pool error
        message: String,
    },

    /// The server backend could not be reached.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Why the backend is unreachable
        message: String,
    },

    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Any other persistence-layer failure.
    #[error("Database error: {0}")]
    Database(DbErr),

    /// I/O failure (creating the data directory, reading config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if let DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) = err {
            return Self::ResourceExhausted {
                message: err.to_string(),
            };
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Conflict { message: detail },
            _ => Self::Database(err),
        }
    }
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by anything displayable.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Text safe to show to an end user.
    ///
    /// Domain errors get a specific, actionable message. Everything else
    /// degrades to a generic failure without leaking internals.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { entity, .. } => format!("Could not find that {entity}."),
            Self::Conflict { .. } => "That already exists.".to_string(),
            Self::Validation { message } => message.clone(),
            _ => "Something went wrong, please try again later.".to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
