//! Error types for the persistence gateway.

use thiserror::Error;

/// Errors returned by storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An account with the same email or username already exists.
    #[error("account already exists")]
    AccountExists,
    /// Any other storage failure; fatal to the calling request.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
