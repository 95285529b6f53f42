use super::access::CachedDbAccess;
use crate::db::CF_BLOCKS;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::block::Block;
use consensus_core::Hash;
use std::sync::Arc;

/// Headers and transactions of accepted blocks
pub struct BlockStore {
    access: CachedDbAccess<Block>,
}

impl BlockStore {
    pub fn new(db: Arc<dyn KeyValueStore>, cache_size: usize) -> Self {
        Self { access: CachedDbAccess::new(db, CF_BLOCKS, cache_size) }
    }

    pub fn insert_batch(&self, batch: &mut StoreBatch, block: &Block) -> DbResult<()> {
        self.access.write_batch(batch, block.hash(), block)
    }

    pub fn get_block(&self, hash: &Hash) -> DbResult<Option<Block>> {
        self.access.read(hash)
    }

    pub fn has_block(&self, hash: &Hash) -> DbResult<bool> {
        self.access.has(hash)
    }

    pub fn delete_batch(&self, batch: &mut StoreBatch, hash: &Hash) {
        self.access.delete_batch(batch, hash)
    }

    pub fn count(&self) -> DbResult<usize> {
        self.access.count()
    }
}
