//! Error types for the document store

use thiserror::Error;

/// Errors that can occur when reading or writing documents
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document ids must be non-empty and must not contain '/'
    #[error("Invalid document id: {0:?}")]
    InvalidDocumentId(String),

    /// Only JSON objects can be stored as documents
    #[error("Document {0} is not a JSON object")]
    NotAnObject(String),

    /// The backing file could not be read or written
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock
    #[error("Store lock poisoned")]
    Poisoned,

    /// The store rejected the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
