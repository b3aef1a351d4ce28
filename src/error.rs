//! Error types for geocache
//!
//! Provides a unified error type for all cache operations, plus the
//! numeric status codes handed to callers that still speak in return codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

/// Status code for bad input (missing or already open directory, empty key,
/// unstorable payload)
pub const INPUT_ERROR: i32 = -1;

/// Status code for a record that could not be serialized
pub const ENCODE_ERROR: i32 = -2;

/// Status code for a stored value that could not be parsed back
pub const DECODE_ERROR: i32 = -3;

/// Status code for storage failures that carry no engine code of their own
pub const OTHER_STORAGE_ERROR: i32 = -4;

/// Unified error type for geocache operations
#[derive(Debug, Error)]
pub enum CacheError {
    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    // -------------------------------------------------------------------------
    // Environment Errors
    // -------------------------------------------------------------------------
    #[error("Environment error: {0}")]
    Environment(#[source] heed::Error),

    #[error("{0} is already open in this process")]
    AlreadyOpen(PathBuf),

    // -------------------------------------------------------------------------
    // Transaction / Storage Errors
    // -------------------------------------------------------------------------
    #[error("Transaction error: {0}")]
    Transaction(#[source] heed::Error),

    #[error("Storage error: {0}")]
    Storage(#[source] heed::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Cannot encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Cannot decode stored value: {0}")]
    Decode(String),
}

impl CacheError {
    /// Numeric status for this error, never zero.
    ///
    /// Storage-layer variants report the engine's own code (an `MDB_*`
    /// constant or an errno value). Local failures use the small negative
    /// constants of this module, which overlap neither range.
    pub fn code(&self) -> i32 {
        match self {
            CacheError::NotADirectory(_)
            | CacheError::InvalidKey(_)
            | CacheError::InvalidPayload(_)
            | CacheError::AlreadyOpen(_) => INPUT_ERROR,
            CacheError::Encode(_) => ENCODE_ERROR,
            CacheError::Decode(_) => DECODE_ERROR,
            CacheError::Environment(e) | CacheError::Transaction(e) | CacheError::Storage(e) => {
                storage_code(e)
            }
        }
    }

    /// True for errors raised before any transaction was attempted
    pub fn is_input_error(&self) -> bool {
        self.code() == INPUT_ERROR
    }
}

fn storage_code(err: &heed::Error) -> i32 {
    match err {
        heed::Error::Mdb(mdb) => mdb.to_err_code(),
        heed::Error::Io(io) => io.raw_os_error().unwrap_or(OTHER_STORAGE_ERROR),
        _ => OTHER_STORAGE_ERROR,
    }
}
