//! Virtual processor for consensus
//!
//! This module resolves the virtual block: it picks the virtual parents from
//! the DAG tips, moves the virtual UTXO set along the selected chain and
//! persists the resulting virtual state.

use crate::consensus::dag::ReachabilityService;
use crate::consensus::ghostdag::GhostdagManager;
use crate::consensus::storage::ConsensusStorage;
use crate::consensus::types::{ChainPath, VirtualUpdate};
use consensus_core::errors::{ConsensusError, ConsensusResult, RuleError};
use consensus_core::multiset::{multiset_from_utxos, MultisetExtensions};
use consensus_core::utxo::UtxoDiff;
use consensus_core::{Hash, ZERO_HASH};
use database::stores::VirtualState;
use database::StoreBatch;
use std::sync::Arc;
use tracing::{debug, info};

/// Virtual processor for virtual state resolution
pub struct VirtualProcessor {
    storage: Arc<ConsensusStorage>,
    ghostdag_manager: Arc<GhostdagManager>,
    reachability: Arc<ReachabilityService>,
    max_block_parents: usize,
}

impl VirtualProcessor {
    pub fn new(
        storage: Arc<ConsensusStorage>,
        ghostdag_manager: Arc<GhostdagManager>,
        reachability: Arc<ReachabilityService>,
        max_block_parents: usize,
    ) -> Self {
        Self { storage, ghostdag_manager, reachability, max_block_parents: max_block_parents.max(1) }
    }

    /// Picks the virtual parents among `tips`: best ranked first, then further
    /// tips by descending rank while the parent limit allows and the mergeset
    /// stays within its size limit.
    pub fn pick_virtual_parents(&self, tips: &[Hash]) -> ConsensusResult<Vec<Hash>> {
        let mut candidates =
            tips.iter().map(|tip| self.ghostdag_manager.sortable_block(*tip)).collect::<ConsensusResult<Vec<_>>>()?;
        candidates.sort_by(|a, b| b.cmp(a));

        let mut parents: Vec<Hash> = Vec::with_capacity(self.max_block_parents);
        for candidate in candidates {
            if parents.len() == self.max_block_parents {
                break;
            }
            if parents.is_empty() {
                parents.push(candidate.hash);
                continue;
            }
            if self.reachability.is_dag_ancestor_of_any(candidate.hash, &parents)? {
                continue;
            }
            parents.push(candidate.hash);
            match self.ghostdag_manager.ghostdag(&parents) {
                Ok(_) => {}
                Err(ConsensusError::Rule(RuleError::AnticoneSizeExceeded { .. })) => {
                    debug!("tip {} left out of the virtual parents: mergeset limit", candidate.hash);
                    parents.pop();
                }
                Err(err) => return Err(err),
            }
        }

        if parents.is_empty() {
            return Err(ConsensusError::internal("the DAG has no tips"));
        }
        Ok(parents)
    }

    /// Selected-chain path from `from` to `to`
    pub fn chain_path(&self, from: Hash, to: Hash) -> ConsensusResult<ChainPath> {
        let store = &self.storage.ghostdag_store;
        let mut path = ChainPath::default();
        let (mut removing, mut adding) = (from, to);

        while removing != adding {
            if removing == ZERO_HASH || adding == ZERO_HASH {
                return Err(ConsensusError::internal(format!("blocks {from} and {to} share no selected chain")));
            }
            if store.get_blue_work(&removing)? >= store.get_blue_work(&adding)? {
                path.removed.push(removing);
                removing = store.get_selected_parent(&removing)?;
            } else {
                path.added.push(adding);
                adding = store.get_selected_parent(&adding)?;
            }
        }
        path.added.reverse();
        Ok(path)
    }

    /// Diff leading along the chain path: reversed diffs of removed blocks, then diffs of added blocks
    pub fn compose_path_diff(&self, path: &ChainPath) -> ConsensusResult<UtxoDiff> {
        let mut diff = UtxoDiff::default();
        for hash in &path.removed {
            diff.with_diff_in_place(&self.storage.utxo_diff_store.get(hash)?.into_reversed())?;
        }
        for hash in &path.added {
            diff.with_diff_in_place(&self.storage.utxo_diff_store.get(hash)?)?;
        }
        Ok(diff)
    }

    /// Diff turning the virtual UTXO set, which is the state of `sink`, into the state of `block`
    pub fn diff_from_virtual(&self, sink: Hash, block: Hash) -> ConsensusResult<UtxoDiff> {
        if sink == block {
            return Ok(UtxoDiff::default());
        }
        let path = self.chain_path(sink, block)?;
        self.compose_path_diff(&path)
    }

    /// Resolves the virtual over the current tips and commits the new virtual state
    pub fn update_virtual(&self, current: &VirtualState) -> ConsensusResult<VirtualUpdate> {
        let tips = self.storage.metadata_store.get_tips()?;
        let virtual_parents = self.pick_virtual_parents(&tips)?;
        let ghostdag_data = self.ghostdag_manager.ghostdag(&virtual_parents)?;
        let old_sink = current.sink();
        let new_sink = ghostdag_data.selected_parent;

        let mut batch = StoreBatch::new();
        let (path, utxo_diff, coin_supply, multiset) = if new_sink != old_sink {
            let path = self.chain_path(old_sink, new_sink)?;
            let diff = self.compose_path_diff(&path)?;
            self.verify_applicable(&diff)?;

            let coin_supply = apply_supply_delta(current.coin_supply, diff.amount_delta())?;
            let mut multiset = current.multiset()?;
            multiset.add_diff(&diff);
            if multiset != self.storage.multiset_store.get(&new_sink)? {
                return Err(ConsensusError::internal(format!("virtual multiset diverges from the multiset of sink {new_sink}")));
            }

            self.storage.virtual_utxo_store.write_diff_batch(&mut batch, &diff)?;
            (path, diff, coin_supply, multiset)
        } else {
            (ChainPath::default(), UtxoDiff::default(), current.coin_supply, current.multiset()?)
        };

        let state = VirtualState::new(virtual_parents.clone(), ghostdag_data, coin_supply, &multiset);
        self.storage.metadata_store.set_virtual_state_batch(&mut batch, &state)?;
        self.storage.commit(batch)?;

        if !path.is_empty() {
            info!(
                "virtual sink moved from {} to {} ({} chain blocks removed, {} added)",
                old_sink,
                new_sink,
                path.removed.len(),
                path.added.len()
            );
        }
        Ok(VirtualUpdate { virtual_parents, sink: new_sink, chain_changes: path.into(), utxo_diff, state })
    }

    /// Every removed entry must be present as is, every added outpoint must be free
    fn verify_applicable(&self, diff: &UtxoDiff) -> ConsensusResult<()> {
        let store = &self.storage.virtual_utxo_store;
        for (outpoint, entry) in diff.remove.iter() {
            if store.get_utxo(outpoint)?.as_ref() != Some(entry) {
                return Err(ConsensusError::internal(format!("virtual UTXO set does not hold {outpoint} removed by the chain diff")));
            }
        }
        for outpoint in diff.add.iter().map(|(outpoint, _)| outpoint) {
            if !diff.remove.contains(outpoint) && store.get_utxo(outpoint)?.is_some() {
                return Err(ConsensusError::internal(format!("virtual UTXO set already holds {outpoint} added by the chain diff")));
            }
        }
        Ok(())
    }

    /// Rebuilds the virtual UTXO set from the pruning point UTXO set and the
    /// chain diffs up to the sink, then commits it with a recomputed supply.
    pub fn rebuild_virtual_utxo_set(&self, current: &VirtualState, pruning_point: Hash) -> ConsensusResult<VirtualState> {
        let sink = current.sink();
        let mut chain = Vec::new();
        let mut block = sink;
        while block != pruning_point {
            if block == ZERO_HASH {
                return Err(ConsensusError::internal(format!("pruning point {pruning_point} is not on the chain of sink {sink}")));
            }
            chain.push(block);
            block = self.storage.ghostdag_store.get_selected_parent(&block)?;
        }

        let mut utxos = self.storage.pruning_point_utxo_store.load_all()?;
        for hash in chain.iter().rev() {
            utxos.apply_diff(&self.storage.utxo_diff_store.get(hash)?)?;
        }

        let multiset = multiset_from_utxos(&utxos);
        if multiset != self.storage.multiset_store.get(&sink)? {
            return Err(ConsensusError::internal(format!("rebuilt UTXO set does not match the multiset of sink {sink}")));
        }
        let coin_supply = u64::try_from(utxos.total_amount())
            .map_err(|_| ConsensusError::internal("coin supply exceeds the representable range"))?;

        let state = VirtualState::new(current.parents.clone(), current.ghostdag_data.clone(), coin_supply, &multiset);
        let mut batch = StoreBatch::new();
        self.storage.virtual_utxo_store.replace_batch(&mut batch, &utxos)?;
        self.storage.metadata_store.set_virtual_state_batch(&mut batch, &state)?;
        self.storage.commit(batch)?;

        let stored_supply = self.storage.virtual_utxo_store.sum_amounts()?;
        if stored_supply != coin_supply as u128 {
            return Err(ConsensusError::internal(format!("stored virtual UTXO set sums to {stored_supply}, expected {coin_supply}")));
        }

        info!("rebuilt virtual UTXO set of {} entries from pruning point {}", utxos.len(), pruning_point);
        Ok(state)
    }
}

fn apply_supply_delta(supply: u64, delta: i128) -> ConsensusResult<u64> {
    u64::try_from(supply as i128 + delta)
        .map_err(|_| ConsensusError::internal(format!("coin supply {supply} cannot change by {delta}")))
}
