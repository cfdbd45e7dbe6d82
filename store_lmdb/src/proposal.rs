//! LMDB implementation of ProposalStore.

use daoship_store::{ProposalStore, StoreError};
use daoship_types::{DaoId, Proposal, ProposalId, ProposalStatus};
use tracing::debug;

use crate::environment::LmdbGovernanceStore;
use crate::meta::{bump_counter, NEXT_PROPOSAL_ID_KEY};
use crate::{decode, encode, LmdbError};

fn index_key(dao_id: &DaoId, id: &ProposalId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&dao_id.to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

impl ProposalStore for LmdbGovernanceStore {
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = bump_counter(&mut wtxn, self.meta_db, NEXT_PROPOSAL_ID_KEY)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(ProposalId::new(id))
    }

    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let key = proposal.id.to_be_bytes();
        let bytes = encode(proposal)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .proposals_db
            .get(&wtxn, key.as_slice())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(proposal.id.to_string()));
        }
        self.proposals_db
            .put(&mut wtxn, key.as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        self.dao_proposals_db
            .put(
                &mut wtxn,
                index_key(&proposal.dao_id, &proposal.id).as_slice(),
                &[],
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .proposals_db
            .get(&rtxn, id.to_be_bytes().as_slice())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(id.to_string()))?;
        Ok(decode(bytes)?)
    }

    fn list_proposals(&self, dao_id: &DaoId) -> Result<Vec<Proposal>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = dao_id.to_be_bytes();
        let iter = self
            .dao_proposals_db
            .prefix_iter(&rtxn, prefix.as_slice())
            .map_err(LmdbError::from)?;
        let mut proposals = Vec::new();
        for entry in iter {
            let (key, _) = entry.map_err(LmdbError::from)?;
            let id_bytes = key
                .get(8..16)
                .ok_or_else(|| StoreError::Corruption("short dao_proposals key".into()))?;
            match self
                .proposals_db
                .get(&rtxn, id_bytes)
                .map_err(LmdbError::from)?
            {
                Some(bytes) => proposals.push(decode(bytes)?),
                None => {
                    return Err(StoreError::Corruption(format!(
                        "index entry for {dao_id} points at a missing proposal"
                    )))
                }
            }
        }
        Ok(proposals)
    }

    fn list_open_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.proposals_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut open = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            let proposal: Proposal = decode(val)?;
            if !proposal.status.is_terminal() {
                open.push(proposal);
            }
        }
        Ok(open)
    }

    fn compare_and_set_status(
        &self,
        id: &ProposalId,
        expected: ProposalStatus,
        new: ProposalStatus,
    ) -> Result<bool, StoreError> {
        let key = id.to_be_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut proposal: Proposal = match self
            .proposals_db
            .get(&wtxn, key.as_slice())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(id.to_string())),
        };
        if proposal.status != expected {
            debug!(%id, stored = %proposal.status, %expected, "status CAS lost");
            return Ok(false);
        }
        proposal.status = new;
        let bytes = encode(&proposal)?;
        self.proposals_db
            .put(&mut wtxn, key.as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }
}
