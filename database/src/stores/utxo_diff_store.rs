use super::access::CachedDbAccess;
use crate::db::CF_UTXO_DIFFS;
use crate::errors::StoreResultExtensions;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::utxo::UtxoDiff;
use consensus_core::Hash;
use std::sync::Arc;

/// UTXO diff of every chain-eligible block relative to its selected parent
pub struct UtxoDiffStore {
    access: CachedDbAccess<UtxoDiff>,
}

impl UtxoDiffStore {
    pub fn new(db: Arc<dyn KeyValueStore>, cache_size: usize) -> Self {
        Self { access: CachedDbAccess::new(db, CF_UTXO_DIFFS, cache_size) }
    }

    pub fn insert_batch(&self, batch: &mut StoreBatch, hash: Hash, diff: &UtxoDiff) -> DbResult<()> {
        self.access.write_batch(batch, hash, diff)
    }

    pub fn get(&self, hash: &Hash) -> DbResult<UtxoDiff> {
        self.access.read(hash).or_not_found(|| format!("utxo diff of {hash}"))
    }

    pub fn delete_batch(&self, batch: &mut StoreBatch, hash: &Hash) {
        self.access.delete_batch(batch, hash)
    }
}
