//! Consensus-specific types
//!
//! This module defines types passed between the processors.

use consensus_core::api::{BlockProcessingResult, ConsensusEvent, VirtualChainChanges};
use consensus_core::utxo::UtxoDiff;
use consensus_core::Hash;
use database::stores::VirtualState;

/// Selected-chain path from one block to another through their common chain ancestor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPath {
    /// Blocks leaving the chain, newest first
    pub removed: Vec<Hash>,
    /// Blocks joining the chain, oldest first
    pub added: Vec<Hash>,
}

impl ChainPath {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

impl From<ChainPath> for VirtualChainChanges {
    fn from(path: ChainPath) -> Self {
        Self { removed: path.removed, added: path.added }
    }
}

/// Outcome of resolving the virtual after a block was committed
#[derive(Debug, Clone)]
pub struct VirtualUpdate {
    pub virtual_parents: Vec<Hash>,
    pub sink: Hash,
    pub chain_changes: VirtualChainChanges,
    /// Net change applied to the virtual UTXO set
    pub utxo_diff: UtxoDiff,
    /// The committed virtual state
    pub state: VirtualState,
}

impl VirtualUpdate {
    pub fn sink_changed(&self) -> bool {
        !self.chain_changes.is_empty()
    }
}

/// Everything the façade needs after a block went through the pipeline
#[derive(Debug, Clone)]
pub struct BlockProcessingOutcome {
    pub result: BlockProcessingResult,
    pub virtual_state: VirtualState,
    /// Events in commit order
    pub events: Vec<ConsensusEvent>,
}
