use super::access::CachedDbAccess;
use crate::db::CF_RELATIONS;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::Hash;
use std::sync::Arc;

/// Direct parents of every block
pub struct RelationsStore {
    parents: CachedDbAccess<Vec<Hash>>,
}

impl RelationsStore {
    pub fn new(db: Arc<dyn KeyValueStore>, cache_size: usize) -> Self {
        Self { parents: CachedDbAccess::new(db, CF_RELATIONS, cache_size) }
    }

    pub fn insert_batch(&self, batch: &mut StoreBatch, hash: Hash, parents: &[Hash]) -> DbResult<()> {
        self.parents.write_batch(batch, hash, &parents.to_vec())
    }

    pub fn get_parents(&self, hash: &Hash) -> DbResult<Option<Vec<Hash>>> {
        self.parents.read(hash)
    }

    pub fn delete_batch(&self, batch: &mut StoreBatch, hash: &Hash) {
        self.parents.delete_batch(batch, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDb;

    #[test]
    fn parents_are_stored_and_deleted() {
        let db: Arc<dyn KeyValueStore> = Arc::new(MemoryDb::new());
        let store = RelationsStore::new(db.clone(), 16);
        let (g, a) = (Hash::from_u64_word(1), Hash::from_u64_word(2));

        let mut batch = StoreBatch::new();
        store.insert_batch(&mut batch, g, &[]).unwrap();
        store.insert_batch(&mut batch, a, &[g]).unwrap();
        db.write(batch).unwrap();
        assert_eq!(store.get_parents(&a).unwrap(), Some(vec![g]));
        assert_eq!(store.get_parents(&g).unwrap(), Some(vec![]));

        let mut batch = StoreBatch::new();
        store.delete_batch(&mut batch, &a);
        db.write(batch).unwrap();
        assert_eq!(store.get_parents(&a).unwrap(), None);
    }
}
