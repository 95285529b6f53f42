use crate::cache::Cache;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::Hash;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Hash-keyed typed access to one column family with a write-through cache.
/// Writes are staged into a [`StoreBatch`]; the cache follows once it is committed.
pub struct CachedDbAccess<T> {
    db: Arc<dyn KeyValueStore>,
    cf: &'static str,
    cache: Arc<Cache<Hash, T>>,
}

impl<T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static> CachedDbAccess<T> {
    pub fn new(db: Arc<dyn KeyValueStore>, cf: &'static str, cache_size: usize) -> Self {
        Self { db, cf, cache: Arc::new(Cache::new(cache_size)) }
    }

    pub fn read(&self, hash: &Hash) -> DbResult<Option<T>> {
        if let Some(value) = self.cache.get(hash) {
            return Ok(Some(value));
        }
        match self.db.get(self.cf, hash.as_bytes())? {
            Some(bytes) => {
                let value: T = bincode::deserialize(&bytes)?;
                self.cache.insert(*hash, value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn has(&self, hash: &Hash) -> DbResult<bool> {
        if self.cache.contains_key(hash) {
            return Ok(true);
        }
        self.db.exists(self.cf, hash.as_bytes())
    }

    pub fn write_batch(&self, batch: &mut StoreBatch, hash: Hash, value: &T) -> DbResult<()> {
        batch.put_serialized(self.cf, hash.as_bytes().to_vec(), value)?;
        let (cache, value) = (self.cache.clone(), value.clone());
        batch.on_commit(move || cache.insert(hash, value));
        Ok(())
    }

    pub fn delete_batch(&self, batch: &mut StoreBatch, hash: &Hash) {
        batch.delete(self.cf, hash.as_bytes().to_vec());
        let (cache, hash) = (self.cache.clone(), *hash);
        batch.on_commit(move || {
            cache.remove(&hash);
        });
    }

    pub fn count(&self) -> DbResult<usize> {
        self.db.count(self.cf)
    }
}
