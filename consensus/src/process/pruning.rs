//! Pruning point management
//!
//! This module advances the pruning point along the selected chain of the
//! sink, moves the pruning point UTXO set forward and deletes the data of
//! blocks below the new pruning point.

use crate::consensus::dag::ReachabilityService;
use crate::consensus::storage::ConsensusStorage;
use consensus_core::config::Config;
use consensus_core::errors::{ConsensusError, ConsensusResult};
use consensus_core::multiset::multiset_from_utxos;
use consensus_core::utxo::UtxoDiff;
use consensus_core::{BlockHashSet, Hash, ZERO_HASH};
use database::StoreBatch;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Pruning configuration
#[derive(Debug, Clone)]
pub struct PruningConfig {
    /// Blue score distance kept between the sink and the pruning point
    pub finality_depth: u64,
    /// Keep the data of blocks below the pruning point
    pub is_archival: bool,
    /// Check the moved UTXO set against the stored multiset before committing
    pub enable_sanity_check: bool,
}

impl From<&Config> for PruningConfig {
    fn from(config: &Config) -> Self {
        Self {
            finality_depth: config.finality_depth,
            is_archival: config.is_archival,
            enable_sanity_check: config.enable_sanity_check_pruning_utxo_set,
        }
    }
}

/// Pruning point manager
pub struct PruningManager {
    config: PruningConfig,
    genesis_hash: Hash,
    storage: Arc<ConsensusStorage>,
    reachability: Arc<ReachabilityService>,
}

impl PruningManager {
    pub fn new(
        config: PruningConfig,
        genesis_hash: Hash,
        storage: Arc<ConsensusStorage>,
        reachability: Arc<ReachabilityService>,
    ) -> Self {
        Self { config, genesis_hash, storage, reachability }
    }

    pub fn pruning_point(&self) -> ConsensusResult<Hash> {
        self.storage.pruning_point_or(self.genesis_hash)
    }

    /// Highest block on the chain of `sink` whose blue score is at least
    /// `finality_depth` below the sink, not going below `current`
    pub fn pruning_point_candidate(&self, sink: Hash, current: Hash) -> ConsensusResult<Hash> {
        let sink_score = self.storage.ghostdag_store.get_blue_score(&sink)?;
        let Some(target_score) = sink_score.checked_sub(self.config.finality_depth) else {
            return Ok(current);
        };

        let mut block = sink;
        loop {
            if block == current || block == ZERO_HASH {
                return Ok(current);
            }
            let Some(data) = self.storage.ghostdag_store.get_data(&block)? else {
                return Ok(current);
            };
            if data.blue_score <= target_score {
                return Ok(block);
            }
            block = data.selected_parent;
        }
    }

    /// Moves the pruning point forward if the sink is deep enough above it.
    /// Returns the new pruning point when it moved.
    pub fn maybe_advance_pruning_point(&self, sink: Hash) -> ConsensusResult<Option<Hash>> {
        let current = self.pruning_point()?;
        let candidate = self.pruning_point_candidate(sink, current)?;
        if candidate == current || !self.reachability.is_chain_ancestor_of(current, candidate)? {
            return Ok(None);
        }

        let diff = self.chain_diff(current, candidate)?;
        if self.config.enable_sanity_check {
            self.check_moved_utxo_set(candidate, &diff)?;
        }

        let mut batch = StoreBatch::new();
        self.storage.pruning_point_utxo_store.write_diff_batch(&mut batch, &diff)?;
        self.storage.metadata_store.set_pruning_point_batch(&mut batch, candidate)?;
        let deleted = if self.config.is_archival { 0 } else { self.stage_block_deletion(&mut batch, candidate)? };
        self.storage.commit(batch)?;

        info!("pruning point moved from {} to {}, {} blocks pruned", current, candidate, deleted);
        Ok(Some(candidate))
    }

    /// Composed diff of the chain blocks in (`from`, `to`], oldest first
    fn chain_diff(&self, from: Hash, to: Hash) -> ConsensusResult<UtxoDiff> {
        let mut chain = Vec::new();
        let mut block = to;
        while block != from {
            if block == ZERO_HASH {
                return Err(ConsensusError::internal(format!("{from} is not on the selected chain of {to}")));
            }
            chain.push(block);
            block = self.storage.ghostdag_store.get_selected_parent(&block)?;
        }

        let mut diff = UtxoDiff::default();
        for hash in chain.iter().rev() {
            diff.with_diff_in_place(&self.storage.utxo_diff_store.get(hash)?)?;
        }
        Ok(diff)
    }

    fn check_moved_utxo_set(&self, new_pruning_point: Hash, diff: &UtxoDiff) -> ConsensusResult<()> {
        let mut utxos = self.storage.pruning_point_utxo_store.load_all()?;
        utxos.apply_diff(diff)?;
        if multiset_from_utxos(&utxos) != self.storage.multiset_store.get(&new_pruning_point)? {
            return Err(ConsensusError::internal(format!(
                "pruning point UTXO set does not match the multiset of {new_pruning_point}"
            )));
        }
        debug!("pruning point UTXO set of {} entries verified", utxos.len());
        Ok(())
    }

    /// Stages the deletion of every strict ancestor of `pruning_point` that still has data
    fn stage_block_deletion(&self, batch: &mut StoreBatch, pruning_point: Hash) -> ConsensusResult<usize> {
        let mut visited = BlockHashSet::new();
        let mut queue = VecDeque::from([pruning_point]);
        let mut deleted = 0;

        while let Some(block) = queue.pop_front() {
            let Some(parents) = self.storage.relations_store.get_parents(&block)? else {
                continue;
            };
            for parent in parents {
                if !visited.insert(parent) || !self.storage.ghostdag_store.has(&parent)? {
                    continue;
                }
                queue.push_back(parent);
                self.storage.block_store.delete_batch(batch, &parent);
                self.storage.ghostdag_store.delete_batch(batch, &parent);
                self.storage.utxo_diff_store.delete_batch(batch, &parent);
                self.storage.multiset_store.delete_batch(batch, &parent);
                deleted += 1;
            }
        }
        // Relations are read by the walk above, so they go last
        for hash in &visited {
            self.storage.relations_store.delete_batch(batch, hash);
        }
        Ok(deleted)
    }
}
