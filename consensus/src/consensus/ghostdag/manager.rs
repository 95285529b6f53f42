use super::protocol::GhostdagProtocol;
use crate::consensus::dag::ReachabilityService;
use crate::consensus::storage::ConsensusStorage;
use consensus_core::errors::ConsensusResult;
use consensus_core::ghostdag::{GhostdagData, SortableBlock};
use consensus_core::{Hash, KType};
use std::sync::Arc;

/// Entry point of the ordering engine used by the processors
pub struct GhostdagManager {
    protocol: GhostdagProtocol,
}

impl GhostdagManager {
    pub fn new(k: KType, mergeset_size_limit: u64, storage: Arc<ConsensusStorage>, reachability: Arc<ReachabilityService>) -> Self {
        Self { protocol: GhostdagProtocol::new(k, mergeset_size_limit, storage, reachability) }
    }

    /// GHOSTDAG data of the genesis block, which has no parents
    pub fn genesis_ghostdag_data(&self) -> GhostdagData {
        GhostdagData::genesis()
    }

    /// Orders a new block, or the virtual, whose parents are `parents`
    pub fn ghostdag(&self, parents: &[Hash]) -> ConsensusResult<GhostdagData> {
        self.protocol.calculate_ghostdag(parents)
    }

    pub fn sortable_block(&self, hash: Hash) -> ConsensusResult<SortableBlock> {
        self.protocol.sortable_block(hash)
    }

    /// Mergeset blues and reds except the selected parent, in consensus order
    pub fn ordered_mergeset_without_selected_parent(&self, data: &GhostdagData) -> ConsensusResult<Vec<Hash>> {
        let mut blocks = data
            .unordered_mergeset_without_selected_parent()
            .map(|hash| self.sortable_block(hash))
            .collect::<ConsensusResult<Vec<_>>>()?;
        blocks.sort();
        Ok(blocks.into_iter().map(|b| b.hash).collect())
    }
}
