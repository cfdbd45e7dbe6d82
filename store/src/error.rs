use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    /// The backend was momentarily unable to serve the request; retrying may succeed.
    #[error("transient storage failure: {0}")]
    Transient(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    /// Whether the persistence adapter may retry the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
