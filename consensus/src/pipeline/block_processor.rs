//! Block processor for consensus
//!
//! This module runs a block through the whole pipeline: isolation checks,
//! GHOSTDAG, UTXO validation and commitment, persistence, virtual resolution
//! and pruning.

use crate::consensus::dag::ReachabilityService;
use crate::consensus::ghostdag::GhostdagManager;
use crate::consensus::storage::ConsensusStorage;
use crate::consensus::types::BlockProcessingOutcome;
use crate::consensus::validation::BlockValidator;
use crate::pipeline::{BodyProcessor, VirtualProcessor};
use crate::process::pruning::PruningManager;
use consensus_core::api::{BlockProcessingResult, ConsensusEvent};
use consensus_core::block::Block;
use consensus_core::errors::{ConsensusResult, RuleError, RuleResult};
use consensus_core::multiset::MultisetExtensions;
use consensus_core::utxo::{ComposedUtxoView, UtxoDiff};
use database::stores::VirtualState;
use database::StoreBatch;
use kash_multiset::Multiset;
use std::sync::Arc;
use tracing::info;

/// Block processor for consensus
pub struct BlockProcessor {
    genesis: Block,
    storage: Arc<ConsensusStorage>,
    reachability: Arc<ReachabilityService>,
    ghostdag_manager: Arc<GhostdagManager>,
    block_validator: Arc<BlockValidator>,
    body_processor: Arc<BodyProcessor>,
    virtual_processor: Arc<VirtualProcessor>,
    pruning_manager: Arc<PruningManager>,
}

impl BlockProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        genesis: Block,
        storage: Arc<ConsensusStorage>,
        reachability: Arc<ReachabilityService>,
        ghostdag_manager: Arc<GhostdagManager>,
        block_validator: Arc<BlockValidator>,
        body_processor: Arc<BodyProcessor>,
        virtual_processor: Arc<VirtualProcessor>,
        pruning_manager: Arc<PruningManager>,
    ) -> Self {
        Self {
            genesis,
            storage,
            reachability,
            ghostdag_manager,
            block_validator,
            body_processor,
            virtual_processor,
            pruning_manager,
        }
    }

    /// Checks needing nothing but the block, safe to run without holding the state lock
    pub fn validate_block_in_isolation(&self, block: &Block) -> RuleResult<()> {
        self.block_validator.validate_block_in_isolation(block)
    }

    /// Stores the genesis block as the only tip and pruning point, then commits its virtual
    pub fn process_genesis(&self) -> ConsensusResult<VirtualState> {
        let hash = self.genesis.hash();
        let empty = Multiset::new();

        let mut batch = StoreBatch::new();
        self.storage.block_store.insert_batch(&mut batch, &self.genesis)?;
        self.storage.ghostdag_store.insert_batch(&mut batch, hash, &self.ghostdag_manager.genesis_ghostdag_data())?;
        self.storage.relations_store.insert_batch(&mut batch, hash, &[])?;
        self.storage.utxo_diff_store.insert_batch(&mut batch, hash, &UtxoDiff::default())?;
        self.storage.multiset_store.insert_batch(&mut batch, hash, &empty)?;
        self.storage.metadata_store.set_tips_batch(&mut batch, &[hash])?;
        self.storage.metadata_store.set_pruning_point_batch(&mut batch, hash)?;
        self.storage.commit(batch)?;

        let virtual_parents = vec![hash];
        let ghostdag_data = self.ghostdag_manager.ghostdag(&virtual_parents)?;
        let state = VirtualState::new(virtual_parents, ghostdag_data, 0, &empty);
        let mut batch = StoreBatch::new();
        self.storage.metadata_store.set_virtual_state_batch(&mut batch, &state)?;
        self.storage.commit(batch)?;

        info!("initialized consensus storage with genesis {}", hash);
        Ok(state)
    }

    /// Validates and commits `block` on top of `virtual_state`. The block must
    /// already have passed [`Self::validate_block_in_isolation`].
    pub fn process_block(&self, block: &Block, virtual_state: &VirtualState) -> ConsensusResult<BlockProcessingOutcome> {
        let hash = block.hash();
        if self.storage.block_store.has_block(&hash)? || self.storage.ghostdag_store.has(&hash)? {
            return Err(RuleError::DuplicateBlock(hash).into());
        }

        let parents = block.header.direct_parents();
        for parent in parents {
            if !self.storage.is_block_live(parent)? {
                return Err(RuleError::MissingParent(*parent).into());
            }
        }

        let ghostdag_data = self.ghostdag_manager.ghostdag(parents)?;
        let selected_parent = ghostdag_data.selected_parent;
        let pruning_point = self.pruning_manager.pruning_point()?;
        if !self.reachability.is_chain_ancestor_of(pruning_point, selected_parent)? {
            return Err(RuleError::PruningPointNotInChain(hash).into());
        }
        self.block_validator.validate_coinbase_blue_score(block, ghostdag_data.blue_score)?;

        let base_diff = self.virtual_processor.diff_from_virtual(virtual_state.sink(), selected_parent)?;
        let base = ComposedUtxoView::new(&self.storage.virtual_utxo_store, &base_diff);
        let (utxo_diff, accepted_transaction_ids) = self.body_processor.calculate_utxo_diff(block, &ghostdag_data, &base)?;

        let mut multiset = self.storage.multiset_store.get(&selected_parent)?;
        multiset.add_diff(&utxo_diff);
        let expected = multiset.finalize();
        if expected != block.header.utxo_commitment {
            return Err(RuleError::UtxoCommitmentMismatch { expected, found: block.header.utxo_commitment }.into());
        }

        let mut tips = self.storage.metadata_store.get_tips()?;
        tips.retain(|tip| !parents.contains(tip));
        tips.push(hash);

        let mut batch = StoreBatch::new();
        self.storage.block_store.insert_batch(&mut batch, block)?;
        self.storage.ghostdag_store.insert_batch(&mut batch, hash, &ghostdag_data)?;
        self.storage.relations_store.insert_batch(&mut batch, hash, parents)?;
        self.storage.utxo_diff_store.insert_batch(&mut batch, hash, &utxo_diff)?;
        self.storage.multiset_store.insert_batch(&mut batch, hash, &multiset)?;
        self.storage.metadata_store.set_tips_batch(&mut batch, &tips)?;
        self.storage.commit(batch)?;

        info!(
            "accepted block {} at blue score {} with {} transactions accepted",
            hash,
            ghostdag_data.blue_score,
            accepted_transaction_ids.len()
        );

        let update = self.virtual_processor.update_virtual(virtual_state)?;
        let mut events = vec![ConsensusEvent::BlockAdded { hash }];
        if update.sink_changed() {
            events.push(ConsensusEvent::VirtualChanged {
                sink: update.sink,
                removed: update.chain_changes.removed.clone(),
                added: update.chain_changes.added.clone(),
            });
        }

        let new_pruning_point = self.pruning_manager.maybe_advance_pruning_point(update.sink)?;
        if let Some(pruning_point) = new_pruning_point {
            events.push(ConsensusEvent::PruningPointUtxoSetOverride { pruning_point });
        }

        Ok(BlockProcessingOutcome {
            result: BlockProcessingResult {
                hash,
                ghostdag_data,
                accepted_transaction_ids,
                sink: update.sink,
                chain_changes: update.chain_changes,
                new_pruning_point,
            },
            virtual_state: update.state,
            events,
        })
    }
}
