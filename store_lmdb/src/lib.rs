//! LMDB storage backend for DAOship.
//!
//! Implements the storage traits from `daoship-store` using the `heed` LMDB bindings.
//! All logical stores live as named databases within a single environment. Values
//! are bincode-encoded records; keys are big-endian ids so iteration follows id order.
//!
//! LMDB admits one write transaction at a time, which is what makes the
//! check-then-write in `insert_vote` and `compare_and_set_status` atomic.

pub mod dao;
pub mod environment;
pub mod error;
pub mod meta;
pub mod proposal;
pub mod vote;

pub use environment::{LmdbEnvironment, LmdbGovernanceStore};
pub use error::LmdbError;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    bincode::serialize(value).map_err(|e| LmdbError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    bincode::deserialize(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))
}
