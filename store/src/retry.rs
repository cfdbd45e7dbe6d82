//! Bounded retry of transient storage failures.
//!
//! Domain logic never retries. Wrapping a backend in [`RetryingStore`] is the one
//! place where a [`StoreError::Transient`] is retried; every other error, and the
//! last transient one once attempts run out, is returned unchanged.

use crate::{DaoStore, ProposalStore, StoreError, VoteStore};
use daoship_types::{Dao, DaoId, Proposal, ProposalId, ProposalStatus, Vote, WalletAddress};
use std::time::Duration;
use tracing::warn;

/// How often and how patiently to retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

/// A store decorator that retries transient failures of the wrapped backend.
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    fn retry<T>(
        &self,
        op: &'static str,
        mut f: impl FnMut(&S) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match f(&self.inner) {
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(op, attempt, error = %e, "transient storage failure, retrying");
                    attempt += 1;
                    if !self.policy.backoff.is_zero() {
                        std::thread::sleep(self.policy.backoff);
                    }
                }
                result => return result,
            }
        }
    }
}

impl<S: DaoStore> DaoStore for RetryingStore<S> {
    fn next_dao_id(&self) -> Result<DaoId, StoreError> {
        self.retry("next_dao_id", |s| s.next_dao_id())
    }

    fn put_dao(&self, dao: &Dao) -> Result<(), StoreError> {
        self.retry("put_dao", |s| s.put_dao(dao))
    }

    fn get_dao(&self, id: &DaoId) -> Result<Dao, StoreError> {
        self.retry("get_dao", |s| s.get_dao(id))
    }

    fn list_daos(&self) -> Result<Vec<Dao>, StoreError> {
        self.retry("list_daos", |s| s.list_daos())
    }
}

impl<S: ProposalStore> ProposalStore for RetryingStore<S> {
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError> {
        self.retry("next_proposal_id", |s| s.next_proposal_id())
    }

    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        self.retry("insert_proposal", |s| s.insert_proposal(proposal))
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        self.retry("get_proposal", |s| s.get_proposal(id))
    }

    fn list_proposals(&self, dao_id: &DaoId) -> Result<Vec<Proposal>, StoreError> {
        self.retry("list_proposals", |s| s.list_proposals(dao_id))
    }

    fn list_open_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        self.retry("list_open_proposals", |s| s.list_open_proposals())
    }

    fn compare_and_set_status(
        &self,
        id: &ProposalId,
        expected: ProposalStatus,
        new: ProposalStatus,
    ) -> Result<bool, StoreError> {
        self.retry("compare_and_set_status", |s| {
            s.compare_and_set_status(id, expected, new)
        })
    }
}

impl<S: VoteStore> VoteStore for RetryingStore<S> {
    fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.retry("insert_vote", |s| s.insert_vote(vote))
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        self.retry("get_votes", |s| s.get_votes(proposal))
    }

    fn has_vote(&self, proposal: &ProposalId, voter: &WalletAddress) -> Result<bool, StoreError> {
        self.retry("has_vote", |s| s.has_vote(proposal, voter))
    }
}
