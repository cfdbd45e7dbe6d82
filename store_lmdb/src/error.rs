use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    /// Reader table exhausted or map resized underneath us; the next attempt may succeed.
    #[error("LMDB temporarily unavailable: {0}")]
    Busy(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        match e {
            heed::Error::Mdb(heed::MdbError::ReadersFull)
            | heed::Error::Mdb(heed::MdbError::MapResized) => LmdbError::Busy(e.to_string()),
            other => LmdbError::Heed(other.to_string()),
        }
    }
}

impl From<LmdbError> for daoship_store::StoreError {
    fn from(e: LmdbError) -> Self {
        use daoship_store::StoreError;
        match e {
            LmdbError::NotFound(key) => StoreError::NotFound(key),
            LmdbError::Busy(msg) => StoreError::Transient(msg),
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
