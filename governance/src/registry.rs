//! DAO registry: creation, lookup and membership.
//!
//! Membership changes rewrite the DAO record, so they are serialized per DAO.
//! They never touch cast votes, and proposals keep the eligible weight they
//! snapshotted when they were created.

use crate::error::GovernanceError;
use crate::locks::KeyedLocks;
use daoship_store::{DaoStore, GovernanceStore, StoreError};
use daoship_types::{
    Dao, DaoId, GovernanceConfig, Member, SharedClock, TokenInfo, WalletAddress, Weight,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

const MAX_NAME_LEN: usize = 100;
const MAX_SYMBOL_LEN: usize = 12;

/// A member as supplied by the caller on join or DAO creation.
#[derive(Clone, Debug)]
pub struct NewMember {
    pub address: WalletAddress,
    pub display_name: Option<String>,
    pub weight: Weight,
}

/// Founder-supplied fields of a new DAO.
#[derive(Clone, Debug)]
pub struct NewDao {
    pub name: String,
    pub description: String,
    pub token: TokenInfo,
    pub config: GovernanceConfig,
    pub founder: NewMember,
}

pub struct DaoRegistry<S> {
    store: Arc<S>,
    clock: SharedClock,
    locks: KeyedLocks<DaoId>,
}

impl<S: GovernanceStore> DaoRegistry<S> {
    pub fn new(store: Arc<S>, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            locks: KeyedLocks::new(),
        }
    }

    /// Create a DAO with the founder as its first member.
    pub fn create(&self, new: NewDao) -> Result<Dao, GovernanceError> {
        validate_new_dao(&new)?;
        let now = self.clock.now();
        let id = self.store.next_dao_id()?;

        let founder = Member {
            address: new.founder.address,
            display_name: new.founder.display_name,
            weight: new.founder.weight,
            joined_at: now,
        };
        let mut members = BTreeMap::new();
        members.insert(founder.address.clone(), founder);

        let dao = Dao {
            id,
            name: new.name.trim().to_string(),
            description: new.description,
            token: TokenInfo {
                name: new.token.name.trim().to_string(),
                symbol: new.token.symbol.trim().to_ascii_uppercase(),
                supply: new.token.supply,
            },
            config: new.config,
            members,
            created_at: now,
        };
        self.store.put_dao(&dao)?;
        info!(dao = %dao.id, name = %dao.name, "DAO created");
        Ok(dao)
    }

    pub fn get(&self, id: &DaoId) -> Result<Dao, GovernanceError> {
        debug!(dao = %id, "loading DAO");
        load_dao(self.store.as_ref(), id)
    }

    /// All DAOs, newest first.
    pub fn list(&self) -> Result<Vec<Dao>, GovernanceError> {
        let mut daos = self.store.list_daos()?;
        daos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(daos)
    }

    pub fn join(&self, id: &DaoId, member: NewMember) -> Result<Dao, GovernanceError> {
        let result = self.locks.with_lock(id, || {
            let mut dao = load_dao(self.store.as_ref(), id)?;
            if dao.members.contains_key(&member.address) {
                return Err(GovernanceError::AlreadyMember(member.address));
            }
            let address = member.address.clone();
            dao.members.insert(
                member.address.clone(),
                Member {
                    address: member.address,
                    display_name: member.display_name,
                    weight: member.weight,
                    joined_at: self.clock.now(),
                },
            );
            self.store.put_dao(&dao)?;
            info!(dao = %id, member = %address, "member joined");
            Ok(dao)
        });
        self.locks.cleanup();
        result
    }

    pub fn leave(&self, id: &DaoId, address: &WalletAddress) -> Result<Dao, GovernanceError> {
        let result = self.locks.with_lock(id, || {
            let mut dao = load_dao(self.store.as_ref(), id)?;
            if dao.members.remove(address).is_none() {
                return Err(GovernanceError::NotMember(address.clone()));
            }
            self.store.put_dao(&dao)?;
            info!(dao = %id, member = %address, "member left");
            Ok(dao)
        });
        self.locks.cleanup();
        result
    }
}

pub(crate) fn load_dao<S: DaoStore + ?Sized>(
    store: &S,
    id: &DaoId,
) -> Result<Dao, GovernanceError> {
    store.get_dao(id).map_err(|e| match e {
        StoreError::NotFound(_) => GovernanceError::DaoNotFound(*id),
        other => other.into(),
    })
}

fn validate_new_dao(new: &NewDao) -> Result<(), GovernanceError> {
    let name = new.name.trim();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(GovernanceError::InvalidConfig(format!(
            "name must be 1..={MAX_NAME_LEN} characters"
        )));
    }
    let symbol = new.token.symbol.trim();
    if symbol.is_empty()
        || symbol.len() > MAX_SYMBOL_LEN
        || !symbol.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(GovernanceError::InvalidConfig(format!(
            "token symbol must be 1..={MAX_SYMBOL_LEN} alphanumeric characters"
        )));
    }
    new.config.validate().map_err(GovernanceError::InvalidConfig)
}
