//! LMDB implementation of VoteStore.

use daoship_store::{StoreError, VoteStore};
use daoship_types::{ProposalId, Vote, WalletAddress};

use crate::environment::LmdbGovernanceStore;
use crate::{decode, encode, LmdbError};

fn vote_key(proposal: &ProposalId, voter: &WalletAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + voter.as_str().len());
    key.extend_from_slice(&proposal.to_be_bytes());
    key.extend_from_slice(voter.as_str().as_bytes());
    key
}

impl VoteStore for LmdbGovernanceStore {
    fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let key = vote_key(&vote.proposal_id, &vote.voter);
        let bytes = encode(vote)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .votes_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "{} on {}",
                vote.voter, vote.proposal_id
            )));
        }
        self.votes_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = proposal.to_be_bytes();
        let iter = self
            .votes_db
            .prefix_iter(&rtxn, prefix.as_slice())
            .map_err(LmdbError::from)?;
        let mut votes = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            votes.push(decode(val)?);
        }
        Ok(votes)
    }

    fn has_vote(&self, proposal: &ProposalId, voter: &WalletAddress) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .votes_db
            .get(&rtxn, &vote_key(proposal, voter))
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }
}
