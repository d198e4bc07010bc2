//! # Store Error Types
//!
//! All errors that can occur in record persistence.

use thiserror::Error;

use crate::codec::DecodeError;

/// Errors that can occur in record persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record file exists for the requested name.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The record file is empty or its bytes fail to decode.
    #[error("corrupt record {name}: {source}")]
    Corrupt {
        /// Name of the corrupt record.
        name: String,
        /// Underlying decode failure.
        source: DecodeError,
    },

    /// `create` was called for a name that already has a record file.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// File or directory access failed.
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
