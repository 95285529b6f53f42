//! Consensus database interface
//!
//! This module bundles every typed store of the engine over a single
//! key/value backend, so that processors can stage writes to several stores
//! in one atomic batch.

use consensus_core::errors::ConsensusResult;
use consensus_core::Hash;
use database::db::{CF_PRUNING_POINT_UTXO_SET, CF_VIRTUAL_UTXO_SET};
use database::stores::{
    BlockStore, GhostdagStore, MetadataStore, MultisetStore, RelationsStore, UtxoDiffStore, UtxoSetStore,
};
use database::{KeyValueStore, StoreBatch};
use std::sync::Arc;

/// Consensus storage coordinator
pub struct ConsensusStorage {
    db: Arc<dyn KeyValueStore>,
    pub block_store: BlockStore,
    pub ghostdag_store: GhostdagStore,
    pub relations_store: RelationsStore,
    pub utxo_diff_store: UtxoDiffStore,
    pub multiset_store: MultisetStore,
    pub virtual_utxo_store: UtxoSetStore,
    pub pruning_point_utxo_store: UtxoSetStore,
    pub metadata_store: MetadataStore,
}

impl ConsensusStorage {
    /// Create the store bundle over `db`, each store caching up to `cache_size` entries
    pub fn new(db: Arc<dyn KeyValueStore>, cache_size: usize) -> Arc<Self> {
        Arc::new(Self {
            block_store: BlockStore::new(db.clone(), cache_size),
            ghostdag_store: GhostdagStore::new(db.clone(), cache_size),
            relations_store: RelationsStore::new(db.clone(), cache_size),
            utxo_diff_store: UtxoDiffStore::new(db.clone(), cache_size),
            multiset_store: MultisetStore::new(db.clone(), cache_size),
            virtual_utxo_store: UtxoSetStore::new(db.clone(), CF_VIRTUAL_UTXO_SET, cache_size),
            pruning_point_utxo_store: UtxoSetStore::new(db.clone(), CF_PRUNING_POINT_UTXO_SET, cache_size),
            metadata_store: MetadataStore::new(db.clone()),
            db,
        })
    }

    /// Atomically commit a staged batch
    pub fn commit(&self, batch: StoreBatch) -> ConsensusResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// True if the block and its GHOSTDAG data are both present
    pub fn is_block_live(&self, hash: &Hash) -> ConsensusResult<bool> {
        Ok(self.ghostdag_store.has(hash)? && self.block_store.has_block(hash)?)
    }

    /// Current pruning point, or `default` on a store that has not pruned yet
    pub fn pruning_point_or(&self, default: Hash) -> ConsensusResult<Hash> {
        Ok(self.metadata_store.get_pruning_point()?.unwrap_or(default))
    }
}
