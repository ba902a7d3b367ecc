//! Core error types for momentum-core.
//!
//! This module defines the error hierarchy using thiserror. Storage and
//! configuration failures are transient and surfaced unchanged to the
//! caller; the remaining variants are user-correctable conditions that the
//! presentation layer turns into inline messaging. No error here is fatal.

use std::path::PathBuf;

use thiserror::Error;

use crate::day::DayKey;

/// Core error type for momentum-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Record store failures (transient, retryable)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A daily record already exists for this calendar day.
    ///
    /// Not a failure of intent: callers treat this as "already done" and
    /// advance as if the submission succeeded.
    #[error("Already completed for {date}")]
    AlreadyCompletedToday { date: DayKey },

    /// Streak recovery was attempted without a reflection text.
    #[error("Recovery requires a brief reflection on the missed day")]
    RecoveryRequiresReflection,

    /// Streak recovery was already exercised within the past week.
    #[error("Recovery already used this week (last used {last_used})")]
    RecoveryAlreadyUsedThisWeek { last_used: DayKey },

    /// Streak recovery was attempted although no day was missed.
    #[error("Nothing to recover: the streak is intact")]
    NothingToRecover,

    /// Malformed submission, rejected before reaching the record store.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Record-store-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A record with the same (user, day) key already exists.
    ///
    /// Raised by the unique index, so the check-then-create sequence is
    /// race-safe even across concurrent sessions.
    #[error("A record already exists for this day")]
    DuplicateDay,

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Storage is temporarily unavailable (locked or busy)
    #[error("Storage unavailable, try again")]
    Unavailable,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse a configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => match e.code {
                rusqlite::ErrorCode::ConstraintViolation => StorageError::DuplicateDay,
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    StorageError::Unavailable
                }
                _ => StorageError::QueryFailed(err.to_string()),
            },
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
