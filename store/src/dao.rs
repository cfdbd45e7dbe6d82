//! DAO storage trait.

use crate::StoreError;
use daoship_types::{Dao, DaoId};

pub trait DaoStore {
    /// Allocate the next unused DAO id.
    fn next_dao_id(&self) -> Result<DaoId, StoreError>;

    /// Insert or replace a DAO record (membership changes rewrite the record).
    fn put_dao(&self, dao: &Dao) -> Result<(), StoreError>;

    /// Get a DAO by id.
    fn get_dao(&self, id: &DaoId) -> Result<Dao, StoreError>;

    /// All DAOs, in id order.
    fn list_daos(&self) -> Result<Vec<Dao>, StoreError>;
}
