//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::meta;
use crate::LmdbError;

/// Named databases in the environment.
const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    daos_db: Database<Bytes, Bytes>,
    proposals_db: Database<Bytes, Bytes>,
    dao_proposals_db: Database<Bytes, Bytes>,
    votes_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment directory is owned by this process; nothing else
        // maps the same file with conflicting flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let daos_db = env.create_database(&mut wtxn, Some("daos"))?;
        let proposals_db = env.create_database(&mut wtxn, Some("proposals"))?;
        let dao_proposals_db = env.create_database(&mut wtxn, Some("dao_proposals"))?;
        let votes_db = env.create_database(&mut wtxn, Some("votes"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        meta::check_schema(&mut wtxn, meta_db)?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            daos_db,
            proposals_db,
            dao_proposals_db,
            votes_db,
            meta_db,
        })
    }

    /// A store handle over this environment. Handles are cheap and share the env.
    pub fn governance_store(&self) -> LmdbGovernanceStore {
        LmdbGovernanceStore {
            env: Arc::clone(&self.env),
            daos_db: self.daos_db,
            proposals_db: self.proposals_db,
            dao_proposals_db: self.dao_proposals_db,
            votes_db: self.votes_db,
            meta_db: self.meta_db,
        }
    }
}

/// LMDB implementation of `DaoStore`, `ProposalStore` and `VoteStore`.
#[derive(Clone)]
pub struct LmdbGovernanceStore {
    pub(crate) env: Arc<Env>,
    /// dao id → `Dao`
    pub(crate) daos_db: Database<Bytes, Bytes>,
    /// proposal id → `Proposal`
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    /// dao id ‖ proposal id → empty
    pub(crate) dao_proposals_db: Database<Bytes, Bytes>,
    /// proposal id ‖ voter address → `Vote`
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}
