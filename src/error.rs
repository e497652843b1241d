//! Error types for record reading, table loading, and index submission.
//!
//! This module provides the [`Error`] type for all fallible library operations
//! and the [`Result`] convenience type. Problems confined to a single output
//! field during extraction are not errors; they are reported as
//! [`FieldIssue`](crate::extract::FieldIssue) values next to the document.

use thiserror::Error;

/// Error type for all library operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error indicating an invalid or malformed bibliographic record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// Invalid lookup table or rule configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The search index rejected a request or returned an unusable response.
    #[error("Index error: {0}")]
    Index(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading or writing delimited tabular data.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error encoding or decoding JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure talking to the search index.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether a record stream can no longer be read after this error.
    ///
    /// The binary reader consumes a whole record before parsing its directory,
    /// so structural problems inside one record leave the stream positioned at
    /// the next record. An unreadable leader or an I/O failure does not.
    #[must_use]
    pub fn is_stream_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidLeader(_) | Error::TruncatedRecord(_) | Error::Io(_)
        )
    }
}

/// Convenience type alias for [`std::result::Result`] with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
