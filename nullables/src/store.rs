//! Nullable store: thread-safe in-memory governance storage for testing.

use daoship_store::{DaoStore, ProposalStore, StoreError, VoteStore};
use daoship_types::{
    Dao, DaoId, Proposal, ProposalId, ProposalStatus, Vote, WalletAddress,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_dao_id: u64,
    next_proposal_id: u64,
    daos: BTreeMap<DaoId, Dao>,
    proposals: BTreeMap<ProposalId, Proposal>,
    votes: BTreeMap<(ProposalId, WalletAddress), Vote>,
}

/// An in-memory DAO + proposal + vote store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// [`fail_next`](Self::fail_next) makes the next operations fail with
/// [`StoreError::Transient`], for exercising retry paths.
#[derive(Default)]
pub struct NullGovernanceStore {
    state: Mutex<State>,
    pending_failures: AtomicU32,
    skip_before_failure: AtomicU32,
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` operations (of any kind) with a transient error.
    pub fn fail_next(&self, n: u32) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Let `skip` operations succeed, then fail the following `n`.
    pub fn fail_after(&self, skip: u32, n: u32) {
        self.skip_before_failure.store(skip, Ordering::SeqCst);
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Number of injected failures not yet consumed.
    pub fn pending_failures(&self) -> u32 {
        self.pending_failures.load(Ordering::SeqCst)
    }

    /// Total number of votes across all proposals.
    pub fn vote_count(&self) -> usize {
        self.state.lock().unwrap().votes.len()
    }

    fn check_fault(&self) -> Result<(), StoreError> {
        let skipped = self
            .skip_before_failure
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if skipped {
            return Ok(());
        }
        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            Err(StoreError::Transient("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

impl DaoStore for NullGovernanceStore {
    fn next_dao_id(&self) -> Result<DaoId, StoreError> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();
        state.next_dao_id += 1;
        Ok(DaoId::new(state.next_dao_id))
    }

    fn put_dao(&self, dao: &Dao) -> Result<(), StoreError> {
        self.check_fault()?;
        self.state.lock().unwrap().daos.insert(dao.id, dao.clone());
        Ok(())
    }

    fn get_dao(&self, id: &DaoId) -> Result<Dao, StoreError> {
        self.check_fault()?;
        self.state
            .lock()
            .unwrap()
            .daos
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_daos(&self) -> Result<Vec<Dao>, StoreError> {
        self.check_fault()?;
        Ok(self.state.lock().unwrap().daos.values().cloned().collect())
    }
}

impl ProposalStore for NullGovernanceStore {
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();
        state.next_proposal_id += 1;
        Ok(ProposalId::new(state.next_proposal_id))
    }

    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();
        if state.proposals.contains_key(&proposal.id) {
            return Err(StoreError::Duplicate(proposal.id.to_string()));
        }
        state.proposals.insert(proposal.id, proposal.clone());
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        self.check_fault()?;
        self.state
            .lock()
            .unwrap()
            .proposals
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_proposals(&self, dao_id: &DaoId) -> Result<Vec<Proposal>, StoreError> {
        self.check_fault()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .proposals
            .values()
            .filter(|p| p.dao_id == *dao_id)
            .cloned()
            .collect())
    }

    fn list_open_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        self.check_fault()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .proposals
            .values()
            .filter(|p| !p.status.is_terminal())
            .cloned()
            .collect())
    }

    fn compare_and_set_status(
        &self,
        id: &ProposalId,
        expected: ProposalStatus,
        new: ProposalStatus,
    ) -> Result<bool, StoreError> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();
        let proposal = state
            .proposals
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if proposal.status != expected {
            return Ok(false);
        }
        proposal.status = new;
        Ok(true)
    }
}

impl VoteStore for NullGovernanceStore {
    fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();
        let key = (vote.proposal_id, vote.voter.clone());
        if state.votes.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "{} on {}",
                vote.voter, vote.proposal_id
            )));
        }
        state.votes.insert(key, vote.clone());
        Ok(())
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        self.check_fault()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .values()
            .filter(|v| v.proposal_id == *proposal)
            .cloned()
            .collect())
    }

    fn has_vote(&self, proposal: &ProposalId, voter: &WalletAddress) -> Result<bool, StoreError> {
        self.check_fault()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .contains_key(&(*proposal, voter.clone())))
    }
}
