//! Block template building
//!
//! This module assembles blocks on top of chosen parents: it orders them,
//! collects fees, builds the coinbase and commits to the resulting UTXO set.

use crate::consensus::ghostdag::GhostdagManager;
use crate::consensus::storage::ConsensusStorage;
use crate::pipeline::{BodyProcessor, VirtualProcessor};
use crate::process::coinbase::CoinbaseManager;
use consensus_core::block::Block;
use consensus_core::constants::BLOCK_VERSION;
use consensus_core::errors::ConsensusResult;
use consensus_core::header::Header;
use consensus_core::multiset::MultisetExtensions;
use consensus_core::tx::{ScriptPublicKey, Transaction};
use consensus_core::utxo::ComposedUtxoView;
use consensus_core::Hash;
use database::stores::VirtualState;
use std::sync::Arc;
use tracing::debug;

/// Everything a template needs besides its parents
#[derive(Debug, Clone, Default)]
pub struct TemplateRequest {
    pub payout_script: ScriptPublicKey,
    pub extra_data: Vec<u8>,
    pub transactions: Vec<Transaction>,
    /// Milliseconds since the epoch
    pub timestamp: u64,
}

/// Builds valid unsolved blocks
pub struct BlockTemplateBuilder {
    block_bits: u32,
    storage: Arc<ConsensusStorage>,
    ghostdag_manager: Arc<GhostdagManager>,
    body_processor: Arc<BodyProcessor>,
    virtual_processor: Arc<VirtualProcessor>,
    coinbase_manager: CoinbaseManager,
}

impl BlockTemplateBuilder {
    pub fn new(
        block_bits: u32,
        storage: Arc<ConsensusStorage>,
        ghostdag_manager: Arc<GhostdagManager>,
        body_processor: Arc<BodyProcessor>,
        virtual_processor: Arc<VirtualProcessor>,
        coinbase_manager: CoinbaseManager,
    ) -> Self {
        Self { block_bits, storage, ghostdag_manager, body_processor, virtual_processor, coinbase_manager }
    }

    /// Builds a block on `parents`. The nonce is left at zero.
    pub fn build_block_with_parents(
        &self,
        virtual_state: &VirtualState,
        parents: Vec<Hash>,
        request: TemplateRequest,
    ) -> ConsensusResult<Block> {
        let ghostdag_data = self.ghostdag_manager.ghostdag(&parents)?;
        let selected_parent = ghostdag_data.selected_parent;
        let daa_score = ghostdag_data.blue_score;

        let base_diff = self.virtual_processor.diff_from_virtual(virtual_state.sink(), selected_parent)?;
        let base = ComposedUtxoView::new(&self.storage.virtual_utxo_store, &base_diff);

        let (mergeset_diff, _) = self.body_processor.accept_mergeset(&ghostdag_data, &base)?;
        let fees =
            self.body_processor.calculate_fees(&request.transactions, &ComposedUtxoView::new(&base, &mergeset_diff), daa_score)?;
        let coinbase = self.coinbase_manager.build_coinbase(daa_score, fees, &request.payout_script, &request.extra_data);

        let mut transactions = Vec::with_capacity(request.transactions.len() + 1);
        transactions.push(coinbase);
        transactions.extend(request.transactions);

        let header =
            Header::new_finalized(BLOCK_VERSION, parents, Hash::zeroed(), Hash::zeroed(), request.timestamp, self.block_bits, 0);
        let mut block = Block::from_parts(header, transactions);

        let (utxo_diff, _) = self.body_processor.calculate_utxo_diff(&block, &ghostdag_data, &base)?;
        let mut multiset = self.storage.multiset_store.get(&selected_parent)?;
        multiset.add_diff(&utxo_diff);
        block.header.utxo_commitment = multiset.finalize();
        block.header.finalize();

        debug!("built template {} at blue score {} with {} fees", block.hash(), daa_score, fees);
        Ok(block)
    }
}
