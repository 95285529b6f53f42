//! Public interface of a running consensus instance

use consensus_core::api::BlockProcessingResult;
use consensus_core::block::Block;
use consensus_core::errors::ConsensusResult;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutpoint, UtxoEntry};
use consensus_core::Hash;
use consensus_pow::State;

/// Block ingestion, template building and state queries
pub trait ConsensusApi: Send + Sync {
    /// Validates a block, commits it and resolves the virtual. Returns the
    /// GHOSTDAG data, accepted transactions and virtual chain changes.
    fn add_block(&self, block: Block) -> ConsensusResult<BlockProcessingResult>;

    /// A block on the virtual parents paying `payout_script`, with its PoW state
    fn build_block_template(&self, payout_script: ScriptPublicKey, extra_data: Vec<u8>) -> ConsensusResult<(Block, State)>;

    /// A block on explicit `parents` carrying `transactions` after its coinbase
    fn build_block_with_parents(
        &self,
        parents: Vec<Hash>,
        payout_script: ScriptPublicKey,
        extra_data: Vec<u8>,
        transactions: Vec<Transaction>,
    ) -> ConsensusResult<Block>;

    fn get_virtual_selected_parent_hash(&self) -> ConsensusResult<Hash>;

    fn get_utxo_by_outpoint(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>>;

    /// Sum of all amounts in the virtual UTXO set
    fn get_coin_supply(&self) -> ConsensusResult<u64>;

    fn get_block_ghostdag_data(&self, hash: &Hash) -> ConsensusResult<Option<GhostdagData>>;

    fn get_block(&self, hash: &Hash) -> ConsensusResult<Option<Block>>;

    /// Number of stored blocks, genesis included
    fn get_block_count(&self) -> ConsensusResult<usize>;

    fn get_tips(&self) -> ConsensusResult<Vec<Hash>>;

    fn get_virtual_parents(&self) -> ConsensusResult<Vec<Hash>>;

    fn get_pruning_point(&self) -> ConsensusResult<Hash>;

    /// Multiset hash of the virtual UTXO set
    fn get_virtual_utxo_commitment(&self) -> ConsensusResult<Hash>;
}
