//! LMDB implementation of DaoStore.

use daoship_store::{DaoStore, StoreError};
use daoship_types::{Dao, DaoId};

use crate::environment::LmdbGovernanceStore;
use crate::meta::{bump_counter, NEXT_DAO_ID_KEY};
use crate::{decode, encode, LmdbError};

impl DaoStore for LmdbGovernanceStore {
    fn next_dao_id(&self) -> Result<DaoId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = bump_counter(&mut wtxn, self.meta_db, NEXT_DAO_ID_KEY)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(DaoId::new(id))
    }

    fn put_dao(&self, dao: &Dao) -> Result<(), StoreError> {
        let bytes = encode(dao)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.daos_db
            .put(&mut wtxn, dao.id.to_be_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_dao(&self, id: &DaoId) -> Result<Dao, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .daos_db
            .get(&rtxn, id.to_be_bytes().as_slice())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(id.to_string()))?;
        Ok(decode(bytes)?)
    }

    fn list_daos(&self) -> Result<Vec<Dao>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.daos_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut daos = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            daos.push(decode(val)?);
        }
        Ok(daos)
    }
}
