//! Ancestry queries over the stored DAG.
//!
//! The past of a block is the union of the mergesets along its selected
//! chain, so DAG ancestry is answered by walking that chain. Blue work
//! strictly increases from a block to any of its descendants, so the walk
//! stops once the chain drops to the blue work of the block it looks for.

use crate::consensus::storage::ConsensusStorage;
use consensus_core::errors::ConsensusResult;
use consensus_core::{Hash, ZERO_HASH};
use database::cache::Cache;
use std::sync::Arc;

/// Ancestry answers kept per (ancestor, descendant) pair. The past of a stored
/// block never changes, so answers stay valid.
const ANCESTRY_CACHE_SIZE: usize = 16_384;

pub struct ReachabilityService {
    storage: Arc<ConsensusStorage>,
    ancestry: Cache<(Hash, Hash), bool>,
}

impl ReachabilityService {
    pub fn new(storage: Arc<ConsensusStorage>) -> Self {
        Self { storage, ancestry: Cache::new(ANCESTRY_CACHE_SIZE) }
    }

    /// Returns true if `ancestor` is in the past of `descendant` or equals it.
    ///
    /// A block whose GHOSTDAG data was pruned lies below the pruning point and
    /// counts as an ancestor of every live block. A live block is never in the
    /// past of a pruned one, so the walk ends where chain data runs out.
    pub fn is_dag_ancestor_of(&self, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        let Some(ancestor_data) = self.storage.ghostdag_store.get_data(&ancestor)? else {
            return Ok(true);
        };
        if let Some(known) = self.ancestry.get(&(ancestor, descendant)) {
            return Ok(known);
        }
        if !self.storage.ghostdag_store.has(&descendant)? {
            return Ok(false);
        }
        let floor = ancestor_data.blue_work;

        let mut current = descendant;
        let found = loop {
            if let Some(known) = self.ancestry.get(&(ancestor, current)) {
                break known;
            }
            let Some(data) = self.storage.ghostdag_store.get_data(&current)? else {
                break false;
            };
            if data.blue_work <= floor {
                break false;
            }
            if data.mergeset_blues.contains(&ancestor) || data.mergeset_reds.contains(&ancestor) {
                break true;
            }
            if data.selected_parent == ZERO_HASH {
                break false;
            }
            current = data.selected_parent;
        };
        self.ancestry.insert((ancestor, descendant), found);
        Ok(found)
    }

    /// Returns true if `ancestor` is on the selected chain of `descendant` (inclusive)
    pub fn is_chain_ancestor_of(&self, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        let Some(ancestor_data) = self.storage.ghostdag_store.get_data(&ancestor)? else {
            return Ok(false);
        };

        let mut current = descendant;
        while let Some(data) = self.storage.ghostdag_store.get_data(&current)? {
            if data.blue_work <= ancestor_data.blue_work || data.selected_parent == ZERO_HASH {
                return Ok(false);
            }
            if data.selected_parent == ancestor {
                return Ok(true);
            }
            current = data.selected_parent;
        }
        Ok(false)
    }

    /// Returns true if `ancestor` is an ancestor of any of `descendants`
    pub fn is_dag_ancestor_of_any(&self, ancestor: Hash, descendants: &[Hash]) -> ConsensusResult<bool> {
        for descendant in descendants {
            if self.is_dag_ancestor_of(ancestor, *descendant)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
