use thiserror::Error;

use crate::{CartId, Version};

/// Errors that can occur when interacting with the cart store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrent request modified the cart between load and commit.
    /// The expected version did not match the actual version.
    #[error(
        "Concurrent modification of cart {cart_id}: expected version {expected}, found {actual}"
    )]
    ConcurrentModification {
        cart_id: CartId,
        expected: Version,
        actual: Version,
    },

    /// A commit was requested but no rows were affected.
    #[error("Commit for cart {cart_id} affected no rows")]
    NothingCommitted { cart_id: CartId },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cart store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
