//! Vote ledger: the only writer of vote records.

use crate::error::GovernanceError;
use crate::locks::KeyedLocks;
use crate::proposals::load_proposal;
use crate::registry::load_dao;
use crate::resolver;
use daoship_store::{GovernanceStore, StoreError};
use daoship_types::{ProposalId, SharedClock, Vote, VoteChoice, WalletAddress, Weight};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct VoteLedger<S> {
    store: Arc<S>,
    clock: SharedClock,
    locks: Arc<KeyedLocks<ProposalId>>,
}

impl<S: GovernanceStore> VoteLedger<S> {
    pub fn new(store: Arc<S>, clock: SharedClock, locks: Arc<KeyedLocks<ProposalId>>) -> Self {
        Self {
            store,
            clock,
            locks,
        }
    }

    /// Record `voter`'s vote on a proposal with an externally supplied weight.
    ///
    /// Checks run in order: the voting window, the voter's weight against the DAO
    /// minimum, then uniqueness. The check and the insert happen under the
    /// proposal's lock, and the store rejects a second insert for the same key on
    /// its own, so concurrent duplicates resolve to exactly one stored vote.
    /// Casting never transitions the proposal.
    pub fn cast_vote(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
        choice: VoteChoice,
        weight: Weight,
    ) -> Result<Vote, GovernanceError> {
        self.record(proposal_id, voter, choice, Some(weight))
    }

    /// Record a vote weighted by the voter's registered membership in the
    /// proposal's DAO. Non-members are not eligible.
    pub fn cast_member_vote(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
        choice: VoteChoice,
    ) -> Result<Vote, GovernanceError> {
        self.record(proposal_id, voter, choice, None)
    }

    fn record(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
        choice: VoteChoice,
        weight: Option<Weight>,
    ) -> Result<Vote, GovernanceError> {
        self.locks.with_lock(proposal_id, || {
            let proposal = load_proposal(self.store.as_ref(), proposal_id)?;
            let now = self.clock.now();
            if !resolver::voting_open(&proposal, now) {
                warn!(proposal = %proposal_id, %voter, "vote outside voting window");
                return Err(GovernanceError::ProposalNotActive(*proposal_id));
            }

            let dao = load_dao(self.store.as_ref(), &proposal.dao_id)?;
            let not_eligible = |have| GovernanceError::NotEligible {
                have,
                need: dao.config.min_tokens_to_participate,
            };
            let weight = match weight {
                Some(weight) => weight,
                None => match dao.member(voter) {
                    Some(member) => member.weight,
                    None => {
                        warn!(proposal = %proposal_id, %voter, "vote from non-member");
                        return Err(not_eligible(0));
                    }
                },
            };
            if !dao.is_eligible(weight) {
                warn!(proposal = %proposal_id, %voter, weight, "vote below participation minimum");
                return Err(not_eligible(weight));
            }

            let duplicate = || GovernanceError::DuplicateVote {
                proposal: *proposal_id,
                voter: voter.clone(),
            };
            if self.store.has_vote(proposal_id, voter)? {
                return Err(duplicate());
            }

            let vote = Vote {
                proposal_id: *proposal_id,
                voter: voter.clone(),
                choice,
                cast_at: now,
                weight,
            };
            match self.store.insert_vote(&vote) {
                Ok(()) => {}
                Err(StoreError::Duplicate(_)) => return Err(duplicate()),
                Err(e) => return Err(e.into()),
            }
            info!(proposal = %proposal_id, %voter, %choice, weight, "vote cast");
            Ok(vote)
        })
    }

    /// All votes on a proposal, in ledger order.
    pub fn get_votes(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        load_proposal(self.store.as_ref(), proposal_id)?;
        let votes = self.store.get_votes(proposal_id)?;
        debug!(proposal = %proposal_id, count = votes.len(), "loaded votes");
        Ok(votes)
    }

    pub fn has_voted(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<bool, GovernanceError> {
        load_proposal(self.store.as_ref(), proposal_id)?;
        Ok(self.store.has_vote(proposal_id, voter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daoship_nullables::{NullClock, NullGovernanceStore};
    use daoship_store::{DaoStore, ProposalStore};
    use daoship_types::{
        Dao, DaoId, GovernanceConfig, Member, Proposal, ProposalStatus, Timestamp, TokenInfo,
    };
    use std::collections::BTreeMap;

    fn addr(s: &str) -> WalletAddress {
        WalletAddress::parse(s).unwrap()
    }

    type Fixture = (
        Arc<NullClock>,
        Arc<NullGovernanceStore>,
        VoteLedger<NullGovernanceStore>,
    );

    fn setup(status: ProposalStatus) -> Fixture {
        let store = Arc::new(NullGovernanceStore::new());
        let clock = Arc::new(NullClock::new(150));
        let member = Member {
            address: addr("alice"),
            display_name: None,
            weight: 500,
            joined_at: Timestamp::new(0),
        };
        let mut members = BTreeMap::new();
        members.insert(member.address.clone(), member);
        store
            .put_dao(&Dao {
                id: DaoId::new(1),
                name: "dao".into(),
                description: String::new(),
                token: TokenInfo {
                    name: "Token".into(),
                    symbol: "TOK".into(),
                    supply: 1_000,
                },
                config: GovernanceConfig::default(),
                members,
                created_at: Timestamp::new(0),
            })
            .unwrap();
        store
            .insert_proposal(&Proposal {
                id: ProposalId::new(1),
                dao_id: DaoId::new(1),
                title: "t".into(),
                description: String::new(),
                creator: addr("alice"),
                created_at: Timestamp::new(100),
                start_time: Timestamp::new(100),
                end_time: Timestamp::new(200),
                status,
                quorum_percent: 50,
                eligible_weight: 500,
            })
            .unwrap();
        let ledger = VoteLedger::new(Arc::clone(&store), clock.clone(), Arc::new(KeyedLocks::new()));
        (clock, store, ledger)
    }

    #[test]
    fn cast_records_vote_with_weight() {
        let (_, store, ledger) = setup(ProposalStatus::Active);
        let id = ProposalId::new(1);
        let vote = ledger.cast_vote(&id, &addr("alice"), VoteChoice::Yes, 500).unwrap();
        assert_eq!(vote.cast_at, Timestamp::new(150));
        assert!(ledger.has_voted(&id, &addr("alice")).unwrap());
        assert_eq!(ledger.get_votes(&id).unwrap(), vec![vote]);
        assert_eq!(store.vote_count(), 1);
        // casting never persists a transition
        assert_eq!(store.get_proposal(&id).unwrap().status, ProposalStatus::Active);
    }

    #[test]
    fn second_vote_is_duplicate_and_first_is_kept() {
        let (_, _, ledger) = setup(ProposalStatus::Active);
        let id = ProposalId::new(1);
        ledger.cast_vote(&id, &addr("alice"), VoteChoice::Yes, 500).unwrap();
        assert!(matches!(
            ledger.cast_vote(&id, &addr("alice"), VoteChoice::No, 500),
            Err(GovernanceError::DuplicateVote { .. })
        ));
        let votes = ledger.get_votes(&id).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].choice, VoteChoice::Yes);
    }

    #[test]
    fn deadline_closes_voting_before_finalization() {
        let (clock, _, ledger) = setup(ProposalStatus::Active);
        clock.set(200);
        assert!(matches!(
            ledger.cast_vote(&ProposalId::new(1), &addr("alice"), VoteChoice::Yes, 500),
            Err(GovernanceError::ProposalNotActive(_))
        ));
    }

    #[test]
    fn terminal_proposal_rejects_votes() {
        let (_, _, ledger) = setup(ProposalStatus::Passed);
        assert!(matches!(
            ledger.cast_vote(&ProposalId::new(1), &addr("alice"), VoteChoice::Yes, 500),
            Err(GovernanceError::ProposalNotActive(_))
        ));
    }

    #[test]
    fn pending_proposal_accepts_votes_once_started() {
        let (clock, _, ledger) = setup(ProposalStatus::Pending);
        let id = ProposalId::new(1);
        clock.set(99);
        assert!(matches!(
            ledger.cast_vote(&id, &addr("alice"), VoteChoice::Yes, 500),
            Err(GovernanceError::ProposalNotActive(_))
        ));
        clock.set(100);
        assert!(ledger.cast_vote(&id, &addr("alice"), VoteChoice::Yes, 500).is_ok());
    }

    #[test]
    fn weight_below_minimum_is_not_eligible() {
        let (_, store, ledger) = setup(ProposalStatus::Active);
        assert!(matches!(
            ledger.cast_vote(&ProposalId::new(1), &addr("bob"), VoteChoice::Yes, 99),
            Err(GovernanceError::NotEligible { have: 99, need: 100 })
        ));
        assert_eq!(store.vote_count(), 0);
    }

    #[test]
    fn member_vote_uses_registered_weight() {
        let (_, _, ledger) = setup(ProposalStatus::Active);
        let vote = ledger
            .cast_member_vote(&ProposalId::new(1), &addr("alice"), VoteChoice::No)
            .unwrap();
        assert_eq!(vote.weight, 500);
    }

    #[test]
    fn non_member_is_rejected_even_without_minimum() {
        let (_, store, ledger) = setup(ProposalStatus::Active);
        let mut dao = store.get_dao(&DaoId::new(1)).unwrap();
        dao.config.min_tokens_to_participate = 0;
        store.put_dao(&dao).unwrap();

        assert!(matches!(
            ledger.cast_member_vote(&ProposalId::new(1), &addr("stranger"), VoteChoice::Yes),
            Err(GovernanceError::NotEligible { have: 0, need: 0 })
        ));
        assert_eq!(store.vote_count(), 0);
    }

    #[test]
    fn closed_window_is_reported_before_membership() {
        let (clock, _, ledger) = setup(ProposalStatus::Active);
        clock.set(200);
        assert!(matches!(
            ledger.cast_member_vote(&ProposalId::new(1), &addr("stranger"), VoteChoice::Yes),
            Err(GovernanceError::ProposalNotActive(_))
        ));
    }

    #[test]
    fn transient_store_failure_surfaces_without_recording() {
        let (_, store, ledger) = setup(ProposalStatus::Active);
        store.fail_next(1);
        assert!(matches!(
            ledger.cast_vote(&ProposalId::new(1), &addr("alice"), VoteChoice::Yes, 500),
            Err(GovernanceError::Store(StoreError::Transient(_)))
        ));
        assert_eq!(store.vote_count(), 0);
    }

    #[test]
    fn unknown_proposal_is_not_found() {
        let (_, _, ledger) = setup(ProposalStatus::Active);
        assert!(matches!(
            ledger.get_votes(&ProposalId::new(9)),
            Err(GovernanceError::ProposalNotFound(_))
        ));
    }
}
