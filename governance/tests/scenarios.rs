//! End-to-end governance flows against the in-memory store and a controlled clock.

use daoship_governance::{
    GovernanceEngine, GovernanceError, NewDao, NewMember, NewProposal, StepOutcome,
};
use daoship_nullables::{NullClock, NullGovernanceStore};
use daoship_store::ProposalStore;
use daoship_types::{
    DaoId, GovernanceConfig, ProposalId, ProposalStatus, TokenInfo, VoteChoice, WalletAddress,
    Weight, SECS_PER_DAY,
};
use std::sync::Arc;

struct Harness {
    clock: Arc<NullClock>,
    engine: GovernanceEngine<NullGovernanceStore>,
    dao_id: DaoId,
}

fn addr(s: &str) -> WalletAddress {
    WalletAddress::parse(s).unwrap()
}

/// A DAO whose only member holds all 100 units of eligible weight.
fn harness() -> Harness {
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let engine = GovernanceEngine::new(Arc::new(NullGovernanceStore::new()), clock.clone());
    let dao_id = engine
        .create_dao(NewDao {
            name: "DeFi Alliance".into(),
            description: "Cross-protocol coordination".into(),
            token: TokenInfo {
                name: "Alliance".into(),
                symbol: "DEFI".into(),
                supply: 100,
            },
            config: GovernanceConfig {
                voting_period_days: 7,
                quorum_percent: 50,
                min_tokens_to_participate: 1,
                voting_delay_hours: 0,
            },
            founder: NewMember {
                address: addr("founder"),
                display_name: None,
                weight: 100,
            },
        })
        .unwrap()
        .id;
    Harness {
        clock,
        engine,
        dao_id,
    }
}

impl Harness {
    fn propose(&self) -> ProposalId {
        self.engine
            .create_proposal(NewProposal {
                dao_id: self.dao_id,
                creator: addr("founder"),
                title: "Treasury diversification".into(),
                description: String::new(),
                voting_period_days: Some(3),
            })
            .unwrap()
            .id
    }

    fn vote(&self, id: &ProposalId, voter: &str, choice: VoteChoice, weight: Weight) {
        self.engine
            .ledger()
            .cast_vote(id, &addr(voter), choice, weight)
            .unwrap();
    }

    fn end_voting(&self) {
        self.clock.advance(3 * SECS_PER_DAY);
    }
}

#[test]
fn quorum_met_and_yes_ahead_passes() {
    let h = harness();
    let id = h.propose();
    h.vote(&id, "v1", VoteChoice::Yes, 30);
    h.vote(&id, "v2", VoteChoice::No, 10);
    h.vote(&id, "v3", VoteChoice::Abstain, 10);
    h.end_voting();

    let view = h.engine.view_proposal(&id).unwrap();
    assert_eq!(view.tally.total, 50);
    assert!(view.quorum_reached);
    assert_eq!(view.proposal.status, ProposalStatus::Passed);
    assert_eq!(h.engine.finalize(&id).unwrap().status(), ProposalStatus::Passed);
}

#[test]
fn turnout_below_quorum_fails() {
    let h = harness();
    let id = h.propose();
    h.vote(&id, "v1", VoteChoice::Yes, 20);
    h.vote(&id, "v2", VoteChoice::No, 20);
    h.end_voting();

    let view = h.engine.view_proposal(&id).unwrap();
    assert!(!view.quorum_reached);
    assert_eq!(view.proposal.status, ProposalStatus::Failed);
    let report = h.engine.sweep().unwrap();
    assert_eq!(report.finalized, vec![(id, ProposalStatus::Failed)]);
}

#[test]
fn yes_no_tie_fails_even_with_quorum() {
    let h = harness();
    let id = h.propose();
    h.vote(&id, "v1", VoteChoice::Yes, 25);
    h.vote(&id, "v2", VoteChoice::No, 25);
    h.vote(&id, "v3", VoteChoice::Abstain, 10);
    h.end_voting();

    let view = h.engine.view_proposal(&id).unwrap();
    assert!(view.quorum_reached);
    assert_eq!(view.tally.total, 60);
    assert_eq!(h.engine.finalize(&id).unwrap().status(), ProposalStatus::Failed);
}

#[test]
fn second_vote_is_rejected_and_first_stands() {
    let h = harness();
    let id = h.propose();
    h.vote(&id, "v1", VoteChoice::Yes, 40);
    let err = h
        .engine
        .ledger()
        .cast_vote(&id, &addr("v1"), VoteChoice::No, 40)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::DuplicateVote { .. }));

    let tally = h.engine.tally(&id).unwrap();
    assert_eq!((tally.yes, tally.no, tally.total), (40, 0, 40));
    assert!(h.engine.has_voted(&id, &addr("v1")).unwrap());
}

#[test]
fn elapsed_deadline_closes_voting_before_sweep() {
    let h = harness();
    let id = h.propose();
    h.end_voting();
    h.clock.advance(1);

    let stored = h.engine.store().get_proposal(&id).unwrap();
    assert_eq!(stored.status, ProposalStatus::Active);
    let err = h
        .engine
        .ledger()
        .cast_vote(&id, &addr("v1"), VoteChoice::Yes, 10)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::ProposalNotActive(_)));
    assert_eq!(err.kind(), "proposal_not_active");
}

#[test]
fn lazy_read_matches_persisted_outcome() {
    let h = harness();
    let id = h.propose();
    h.vote(&id, "v1", VoteChoice::Yes, 60);
    h.end_voting();

    let lazy = h.engine.get_proposal(&id).unwrap().status;
    h.engine.sweep().unwrap();
    let stored = h.engine.store().get_proposal(&id).unwrap().status;
    assert_eq!(lazy, stored);
    assert_eq!(h.engine.get_proposal(&id).unwrap().status, stored);
}

#[test]
fn lifecycle_never_moves_backwards() {
    let h = harness();
    let id = h.propose();
    h.vote(&id, "v1", VoteChoice::Yes, 60);
    h.end_voting();
    h.engine.sweep().unwrap();

    // later votes and sweeps leave the terminal status alone
    assert!(matches!(
        h.engine.ledger().cast_vote(&id, &addr("v2"), VoteChoice::No, 90),
        Err(GovernanceError::ProposalNotActive(_))
    ));
    h.clock.advance(30 * SECS_PER_DAY);
    assert!(h.engine.sweep().unwrap().is_empty());
    assert_eq!(
        h.engine.finalize(&id).unwrap(),
        StepOutcome::Unchanged(ProposalStatus::Passed)
    );
}

#[test]
fn member_votes_carry_registered_weight() {
    let h = harness();
    let id = h.propose();
    h.engine
        .cast_vote(&id, &addr("founder"), VoteChoice::Yes)
        .unwrap();
    assert_eq!(h.engine.tally(&id).unwrap().yes, 100);

    let err = h
        .engine
        .cast_vote(&id, &addr("outsider"), VoteChoice::Yes)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::NotEligible { have: 0, .. }));
}

#[test]
fn membership_changes_do_not_move_snapshotted_quorum() {
    let h = harness();
    let id = h.propose();
    h.engine
        .join_dao(
            &h.dao_id,
            NewMember {
                address: addr("whale"),
                display_name: None,
                weight: 10_000,
            },
        )
        .unwrap();
    h.vote(&id, "v1", VoteChoice::Yes, 50);
    h.end_voting();

    let view = h.engine.view_proposal(&id).unwrap();
    assert_eq!(view.proposal.eligible_weight, 100);
    assert_eq!(view.proposal.status, ProposalStatus::Passed);
}

#[test]
fn list_filters_by_effective_status() {
    let h = harness();
    let closed = h.propose();
    h.end_voting();
    let open = h.propose();

    let active = h
        .engine
        .list_proposals(&h.dao_id, Some(ProposalStatus::Active))
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, open);
    let failed = h
        .engine
        .list_proposals(&h.dao_id, Some(ProposalStatus::Failed))
        .unwrap();
    assert_eq!(failed[0].id, closed);
}
