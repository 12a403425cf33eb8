// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Error types for snapshot store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for snapshot store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during snapshot store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to load the snapshot file into memory
    #[error("Failed to open snapshot at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Writing the in-memory image back to disk failed.
    ///
    /// The in-memory state already reflects the mutation that triggered
    /// the write.
    #[error("Failed to persist snapshot to '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: PersistError,
    },

    /// A UNIQUE or PRIMARY KEY constraint rejected the write
    #[error("Unique constraint violated: {detail}")]
    UniqueConstraintViolation { detail: String },

    /// A FOREIGN KEY constraint rejected the write
    #[error("Referenced row does not exist: {detail}")]
    MissingReference { detail: String },

    /// An additive column migration failed for a reason other than the
    /// column already being present
    #[error("Failed to add column {table}.{column}: {source}")]
    Migration {
        table: &'static str,
        column: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A seed file exists but cannot be used
    #[error("Invalid seed file '{path}': {reason}")]
    Seed { path: PathBuf, reason: String },
}

/// Underlying cause of a [`Error::Persistence`] failure.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Classify a failed write statement.
    ///
    /// Constraint failures become their own variants so callers can map them
    /// to client errors; everything else stays a plain SQLite error.
    pub(crate) fn from_statement(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, message) = &err {
            let detail = message.clone().unwrap_or_else(|| code.to_string());
            match code.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Error::UniqueConstraintViolation { detail };
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Error::MissingReference { detail };
                }
                _ => {}
            }
        }
        Error::Sqlite(err)
    }

    /// Whether the in-memory state may be ahead of the file on disk.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Error::Persistence { .. })
    }
}
