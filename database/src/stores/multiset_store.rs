use super::access::CachedDbAccess;
use crate::db::CF_MULTISETS;
use crate::errors::{DbError, StoreResultExtensions};
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::Hash;
use kash_multiset::Multiset;
use std::sync::Arc;

/// Multiset of the UTXO state after each block, kept in its 64-byte form
pub struct MultisetStore {
    access: CachedDbAccess<Vec<u8>>,
}

impl MultisetStore {
    pub fn new(db: Arc<dyn KeyValueStore>, cache_size: usize) -> Self {
        Self { access: CachedDbAccess::new(db, CF_MULTISETS, cache_size) }
    }

    pub fn insert_batch(&self, batch: &mut StoreBatch, hash: Hash, multiset: &Multiset) -> DbResult<()> {
        self.access.write_batch(batch, hash, &multiset.to_bytes().to_vec())
    }

    pub fn get(&self, hash: &Hash) -> DbResult<Multiset> {
        let bytes = self.access.read(hash).or_not_found(|| format!("multiset of {hash}"))?;
        Multiset::from_bytes(&bytes).map_err(|err| DbError::InvalidData(format!("multiset of {hash}: {err}")))
    }

    pub fn delete_batch(&self, batch: &mut StoreBatch, hash: &Hash) {
        self.access.delete_batch(batch, hash)
    }
}
