//! LMDB backend tests: records survive reopening, and the two atomic
//! operations (vote insert, status compare-and-set) behave as the traits promise.

use std::collections::BTreeMap;

use daoship_store::{DaoStore, ProposalStore, StoreError, VoteStore};
use daoship_store_lmdb::{LmdbEnvironment, LmdbGovernanceStore};
use daoship_types::{
    Dao, DaoId, GovernanceConfig, Proposal, ProposalId, ProposalStatus, Timestamp, TokenInfo,
    Vote, VoteChoice, WalletAddress,
};

const MAP_SIZE: usize = 16 * 1024 * 1024;

fn temp_store() -> (tempfile::TempDir, LmdbGovernanceStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), MAP_SIZE).expect("open env");
    (dir, env.governance_store())
}

fn addr(s: &str) -> WalletAddress {
    WalletAddress::parse(s).unwrap()
}

fn dao(id: DaoId) -> Dao {
    Dao {
        id,
        name: "DeFiGuild".into(),
        description: "DeFi governance".into(),
        token: TokenInfo {
            name: "DeFi Guild".into(),
            symbol: "DFG".into(),
            supply: 500_000,
        },
        config: GovernanceConfig::default(),
        members: BTreeMap::new(),
        created_at: Timestamp::new(10),
    }
}

fn proposal(id: ProposalId, dao_id: DaoId) -> Proposal {
    Proposal {
        id,
        dao_id,
        title: "Increase staking rewards".into(),
        description: String::new(),
        creator: addr("creator"),
        created_at: Timestamp::new(100),
        start_time: Timestamp::new(100),
        end_time: Timestamp::new(700),
        status: ProposalStatus::Active,
        quorum_percent: 50,
        eligible_weight: 100,
    }
}

fn vote(id: ProposalId, voter: &str, choice: VoteChoice) -> Vote {
    Vote {
        proposal_id: id,
        voter: addr(voter),
        choice,
        cast_at: Timestamp::new(200),
        weight: 10,
    }
}

#[test]
fn ids_are_sequential_from_one() {
    let (_dir, store) = temp_store();
    assert_eq!(store.next_dao_id().unwrap(), DaoId::new(1));
    assert_eq!(store.next_dao_id().unwrap(), DaoId::new(2));
    assert_eq!(store.next_proposal_id().unwrap(), ProposalId::new(1));
}

#[test]
fn dao_round_trips_and_lists() {
    let (_dir, store) = temp_store();
    store.put_dao(&dao(DaoId::new(2))).unwrap();
    store.put_dao(&dao(DaoId::new(1))).unwrap();
    assert_eq!(store.get_dao(&DaoId::new(2)).unwrap().token.symbol, "DFG");
    let ids: Vec<_> = store.list_daos().unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![DaoId::new(1), DaoId::new(2)]);
    assert!(matches!(
        store.get_dao(&DaoId::new(9)),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn proposals_are_indexed_per_dao() {
    let (_dir, store) = temp_store();
    store.insert_proposal(&proposal(ProposalId::new(1), DaoId::new(1))).unwrap();
    store.insert_proposal(&proposal(ProposalId::new(2), DaoId::new(2))).unwrap();
    store.insert_proposal(&proposal(ProposalId::new(3), DaoId::new(1))).unwrap();

    let ids: Vec<_> = store
        .list_proposals(&DaoId::new(1))
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![ProposalId::new(1), ProposalId::new(3)]);
}

#[test]
fn duplicate_proposal_id_rejected() {
    let (_dir, store) = temp_store();
    let p = proposal(ProposalId::new(1), DaoId::new(1));
    store.insert_proposal(&p).unwrap();
    assert!(matches!(
        store.insert_proposal(&p),
        Err(StoreError::Duplicate(_))
    ));
}

#[test]
fn second_vote_is_rejected_and_first_kept() {
    let (_dir, store) = temp_store();
    let id = ProposalId::new(1);
    store.insert_vote(&vote(id, "alice", VoteChoice::Yes)).unwrap();
    let err = store.insert_vote(&vote(id, "alice", VoteChoice::No)).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));

    let votes = store.get_votes(&id).unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].choice, VoteChoice::Yes);
    assert!(store.has_vote(&id, &addr("alice")).unwrap());
    assert!(!store.has_vote(&id, &addr("bob")).unwrap());
}

#[test]
fn votes_are_scoped_to_their_proposal() {
    let (_dir, store) = temp_store();
    store.insert_vote(&vote(ProposalId::new(1), "alice", VoteChoice::Yes)).unwrap();
    store.insert_vote(&vote(ProposalId::new(2), "alice", VoteChoice::No)).unwrap();
    store.insert_vote(&vote(ProposalId::new(2), "bob", VoteChoice::Abstain)).unwrap();
    assert_eq!(store.get_votes(&ProposalId::new(1)).unwrap().len(), 1);
    assert_eq!(store.get_votes(&ProposalId::new(2)).unwrap().len(), 2);
}

#[test]
fn status_cas_only_applies_once() {
    let (_dir, store) = temp_store();
    let id = ProposalId::new(1);
    store.insert_proposal(&proposal(id, DaoId::new(1))).unwrap();

    assert!(store
        .compare_and_set_status(&id, ProposalStatus::Active, ProposalStatus::Passed)
        .unwrap());
    assert!(!store
        .compare_and_set_status(&id, ProposalStatus::Active, ProposalStatus::Failed)
        .unwrap());
    assert_eq!(store.get_proposal(&id).unwrap().status, ProposalStatus::Passed);
    assert!(store.list_open_proposals().unwrap().is_empty());
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = LmdbEnvironment::open(dir.path(), MAP_SIZE)
            .unwrap()
            .governance_store();
        store.next_proposal_id().unwrap();
        store.insert_proposal(&proposal(ProposalId::new(1), DaoId::new(1))).unwrap();
        store.insert_vote(&vote(ProposalId::new(1), "alice", VoteChoice::Yes)).unwrap();
    }
    let store = LmdbEnvironment::open(dir.path(), MAP_SIZE)
        .unwrap()
        .governance_store();
    assert_eq!(store.next_proposal_id().unwrap(), ProposalId::new(2));
    assert_eq!(store.get_votes(&ProposalId::new(1)).unwrap().len(), 1);
}
