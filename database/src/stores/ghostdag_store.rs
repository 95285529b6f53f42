use super::access::CachedDbAccess;
use crate::db::CF_GHOSTDAG;
use crate::errors::StoreResultExtensions;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::{BlueWorkType, Hash};
use std::sync::Arc;

pub struct GhostdagStore {
    access: CachedDbAccess<GhostdagData>,
}

impl GhostdagStore {
    pub fn new(db: Arc<dyn KeyValueStore>, cache_size: usize) -> Self {
        Self { access: CachedDbAccess::new(db, CF_GHOSTDAG, cache_size) }
    }

    pub fn insert_batch(&self, batch: &mut StoreBatch, hash: Hash, data: &GhostdagData) -> DbResult<()> {
        self.access.write_batch(batch, hash, data)
    }

    pub fn delete_batch(&self, batch: &mut StoreBatch, hash: &Hash) {
        self.access.delete_batch(batch, hash)
    }

    pub fn get_data(&self, hash: &Hash) -> DbResult<Option<GhostdagData>> {
        self.access.read(hash)
    }

    /// Like [`Self::get_data`] but a missing entry is an error
    pub fn get_existing(&self, hash: &Hash) -> DbResult<GhostdagData> {
        self.get_data(hash).or_not_found(|| format!("ghostdag data of {hash}"))
    }

    pub fn has(&self, hash: &Hash) -> DbResult<bool> {
        self.access.has(hash)
    }

    pub fn get_blue_work(&self, hash: &Hash) -> DbResult<BlueWorkType> {
        Ok(self.get_existing(hash)?.blue_work)
    }

    pub fn get_blue_score(&self, hash: &Hash) -> DbResult<u64> {
        Ok(self.get_existing(hash)?.blue_score)
    }

    pub fn get_selected_parent(&self, hash: &Hash) -> DbResult<Hash> {
        Ok(self.get_existing(hash)?.selected_parent)
    }
}
