use std::path::PathBuf;

use crate::codec::DecodeError;

/// Errors raised while opening a container
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The path does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file does not start with the SQLite 3 header
    #[error("Not an SQLite database: {0}")]
    NotSqlite(PathBuf),

    /// A table of the mzDB schema is absent
    #[error("Missing table: {0}")]
    MissingTable(String),

    /// The `mzdb` table has no version
    #[error("Missing mzDB version")]
    MissingVersion,

    /// A version outside the supported range
    #[error("Unsupported mzDB version: {0}")]
    UnsupportedVersion(String),

    /// I/O error while probing the file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// SQLite error while opening or loading the index
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
}

/// Errors returned by [`MzdbStore`](super::MzdbStore) queries
#[derive(Debug, thiserror::Error)]
pub enum MzdbError {
    /// The container could not be opened
    #[error("Open error: {0}")]
    Open(#[from] OpenError),

    /// The store was closed
    #[error("Store is closed")]
    Closed,

    /// No record with the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// SQLite error during a query
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl MzdbError {
    pub(crate) fn not_found(what: &str, id: i64) -> Self {
        MzdbError::NotFound(format!("{} {}", what, id))
    }
}
