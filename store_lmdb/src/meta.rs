//! Id counters and schema version, kept in the `meta` database.

use heed::types::Bytes;
use heed::{Database, RwTxn};
use tracing::info;

use crate::LmdbError;

/// The schema version that the current code writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
pub(crate) const NEXT_DAO_ID_KEY: &[u8] = b"next_dao_id";
pub(crate) const NEXT_PROPOSAL_ID_KEY: &[u8] = b"next_proposal_id";

/// Stamp a fresh database with the current version; refuse one written by newer code.
pub(crate) fn check_schema(
    wtxn: &mut RwTxn<'_>,
    meta_db: Database<Bytes, Bytes>,
) -> Result<(), LmdbError> {
    let stored = match meta_db.get(wtxn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => Some(read_u32(bytes)?),
        None => None,
    };
    match stored {
        Some(found) if found > CURRENT_SCHEMA_VERSION => Err(LmdbError::SchemaTooNew {
            found,
            supported: CURRENT_SCHEMA_VERSION,
        }),
        Some(found) => {
            info!(version = found, "database schema is up to date");
            Ok(())
        }
        None => {
            meta_db.put(
                wtxn,
                SCHEMA_VERSION_KEY,
                CURRENT_SCHEMA_VERSION.to_le_bytes().as_slice(),
            )?;
            Ok(())
        }
    }
}

/// Increment the counter at `key` and return the value it held. Counters start at 1.
pub(crate) fn bump_counter(
    wtxn: &mut RwTxn<'_>,
    meta_db: Database<Bytes, Bytes>,
    key: &[u8],
) -> Result<u64, LmdbError> {
    let current = match meta_db.get(wtxn, key)? {
        Some(bytes) => read_u64(bytes)?,
        None => 1,
    };
    meta_db.put(wtxn, key, (current + 1).to_le_bytes().as_slice())?;
    Ok(current)
}

fn read_u32(bytes: &[u8]) -> Result<u32, LmdbError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("schema_version has unexpected byte length".into()))?;
    Ok(u32::from_le_bytes(arr))
}

fn read_u64(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("id counter has unexpected byte length".into()))?;
    Ok(u64::from_le_bytes(arr))
}
