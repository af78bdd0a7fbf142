// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for reel-core operations.

use thiserror::Error;

use crate::protocol::ErrorCode;

/// All possible errors that can occur while reading or mutating lists.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication required\n  hint: set an owner in .reel/config.toml or REEL_OWNER")]
    AuthenticationRequired,

    #[error("list not found: {0}")]
    ListNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("item already exists: {0}")]
    ItemAlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Builds the error for an item lookup by `(list_id, external_ref)`.
    pub fn item_not_found(list_id: &str, external_ref: i64) -> Self {
        Error::ItemNotFound(format!("{external_ref} in list {list_id}"))
    }

    /// Builds the error for a duplicate `(list_id, external_ref)` pair.
    pub fn item_exists(list_id: &str, external_ref: i64) -> Self {
        Error::ItemAlreadyExists(format!("{external_ref} in list {list_id}"))
    }

    /// Wire code used when this error is reported by the remote store.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::AuthenticationRequired => ErrorCode::AuthenticationRequired,
            Error::ListNotFound(_) => ErrorCode::ListNotFound,
            Error::ItemNotFound(_) => ErrorCode::ItemNotFound,
            Error::ItemAlreadyExists(_) => ErrorCode::ItemAlreadyExists,
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            _ => ErrorCode::Internal,
        }
    }

    /// Rebuilds a typed error from a remote error response.
    ///
    /// Anything the caller cannot act on (unsupported endpoints, server
    /// faults) collapses into [`Error::RemoteUnavailable`].
    pub fn from_remote(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::AuthenticationRequired => Error::AuthenticationRequired,
            ErrorCode::ListNotFound => Error::ListNotFound(message),
            ErrorCode::ItemNotFound => Error::ItemNotFound(message),
            ErrorCode::ItemAlreadyExists => Error::ItemAlreadyExists(message),
            ErrorCode::InvalidArgument => Error::InvalidArgument(message),
            ErrorCode::Unsupported | ErrorCode::Internal => Error::RemoteUnavailable(message),
        }
    }
}

/// A specialized Result type for reel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
