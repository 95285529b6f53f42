use super::mergeset::MergesetBuilder;
use crate::consensus::dag::ReachabilityService;
use crate::consensus::storage::ConsensusStorage;
use consensus_core::errors::{ConsensusError, ConsensusResult, RuleError};
use consensus_core::ghostdag::{GhostdagData, SortableBlock};
use consensus_core::{BlockHashMap, BlueWorkType, Hash, KType, ZERO_HASH};
use consensus_pow::calc_work;
use database::errors::StoreResultExtensions;
use std::sync::Arc;
use tracing::debug;

/// Outcome of testing a mergeset block against the k-cluster rule
enum ColoringOutput {
    Blue(KType, BlockHashMap<KType>),
    Red,
}

/// Partial result of checking a candidate against the blues of one chain block
enum ColoringState {
    Blue,
    Red,
    Pending,
}

/// Chain block visited while colouring. `hash` is `None` for the block being coloured.
struct ChainBlock<'a> {
    hash: Option<Hash>,
    data: ChainBlockData<'a>,
}

enum ChainBlockData<'a> {
    New(&'a GhostdagData),
    Stored(GhostdagData),
}

impl ChainBlockData<'_> {
    fn get(&self) -> &GhostdagData {
        match self {
            ChainBlockData::New(data) => data,
            ChainBlockData::Stored(data) => data,
        }
    }
}

/// The GHOSTDAG k-cluster protocol: selected parent, mergeset colouring,
/// blue score and blue work of a new block.
pub struct GhostdagProtocol {
    k: KType,
    mergeset_size_limit: u64,
    storage: Arc<ConsensusStorage>,
    reachability: Arc<ReachabilityService>,
}

impl GhostdagProtocol {
    pub fn new(k: KType, mergeset_size_limit: u64, storage: Arc<ConsensusStorage>, reachability: Arc<ReachabilityService>) -> Self {
        Self { k, mergeset_size_limit, storage, reachability }
    }

    /// Ranking key of a stored block
    pub fn sortable_block(&self, hash: Hash) -> ConsensusResult<SortableBlock> {
        Ok(SortableBlock::new(hash, self.storage.ghostdag_store.get_blue_work(&hash)?))
    }

    /// The parent with the most blue work, ties going to the smaller hash
    fn select_parent(&self, parents: &[Hash]) -> ConsensusResult<Hash> {
        let mut best: Option<SortableBlock> = None;
        for parent in parents {
            let candidate = self.sortable_block(*parent)?;
            if best.map_or(true, |b| candidate > b) {
                best = Some(candidate);
            }
        }
        best.map(|b| b.hash).ok_or(ConsensusError::Rule(RuleError::NoParents))
    }

    /// Runs GHOSTDAG over `parents`, which must all have GHOSTDAG data
    pub fn calculate_ghostdag(&self, parents: &[Hash]) -> ConsensusResult<GhostdagData> {
        if let Some(duplicate) = first_duplicate(parents) {
            return Err(RuleError::DuplicateParent(duplicate).into());
        }
        for parent in parents {
            if !self.storage.ghostdag_store.has(parent)? {
                return Err(RuleError::MissingParent(*parent).into());
            }
        }

        let selected_parent = self.select_parent(parents)?;
        let mergeset = MergesetBuilder::new(&self.storage, &self.reachability, self.mergeset_size_limit)
            .ordered_mergeset_without_selected_parent(selected_parent, parents)?;

        let pruning_point = self.storage.metadata_store.get_pruning_point()?;
        let mut new_block_data = GhostdagData::new_with_selected_parent(selected_parent, self.k);
        for blue_candidate in mergeset.iter().copied() {
            match self.check_blue_candidate(&new_block_data, blue_candidate, pruning_point)? {
                ColoringOutput::Blue(blue_anticone_size, blues_anticone_sizes) => {
                    new_block_data.add_blue(blue_candidate, blue_anticone_size, &blues_anticone_sizes)
                }
                ColoringOutput::Red => new_block_data.add_red(blue_candidate),
            }
        }

        let selected_parent_data = self.storage.ghostdag_store.get_existing(&selected_parent)?;
        let blue_score = selected_parent_data.blue_score + new_block_data.mergeset_blues.len() as u64;
        let blue_work = self.calculate_blue_work(selected_parent_data.blue_work, &new_block_data.mergeset_blues)?;
        new_block_data.finalize_score_and_work(blue_score, blue_work);

        debug!(
            "ghostdag: selected parent {}, {} blues, {} reds, blue score {}",
            selected_parent,
            new_block_data.mergeset_blues.len(),
            new_block_data.mergeset_reds.len(),
            blue_score
        );
        Ok(new_block_data)
    }

    fn calculate_blue_work(&self, base: BlueWorkType, blues: &[Hash]) -> ConsensusResult<BlueWorkType> {
        let mut blue_work = base;
        for blue in blues {
            let block = self.storage.block_store.get_block(blue).or_not_found(|| format!("block {blue}"))?;
            blue_work = blue_work.saturating_add(calc_work(block.header.bits));
        }
        Ok(blue_work)
    }

    /// Colours `blue_candidate` by walking the selected chain of the new block.
    /// The walk never passes `pruning_point`: a candidate outside its future
    /// is red on archival and pruned nodes alike.
    fn check_blue_candidate(
        &self,
        new_block_data: &GhostdagData,
        blue_candidate: Hash,
        pruning_point: Option<Hash>,
    ) -> ConsensusResult<ColoringOutput> {
        // The maximum length of a k-cluster chain is k+1 including the selected parent
        if new_block_data.mergeset_blues.len() as u64 == self.k as u64 + 1 {
            return Ok(ColoringOutput::Red);
        }

        let mut candidate_blues_anticone_sizes: BlockHashMap<KType> = BlockHashMap::with_capacity(self.k as usize);
        let mut candidate_blue_anticone_size: KType = 0;

        let mut chain_block = ChainBlock { hash: None, data: ChainBlockData::New(new_block_data) };
        loop {
            let state = self.check_blue_candidate_with_chain_block(
                new_block_data,
                &chain_block,
                blue_candidate,
                &mut candidate_blues_anticone_sizes,
                &mut candidate_blue_anticone_size,
            )?;
            match state {
                ColoringState::Blue => break,
                ColoringState::Red => return Ok(ColoringOutput::Red),
                ColoringState::Pending => {}
            }

            if chain_block.hash.is_some() && chain_block.hash == pruning_point {
                return Ok(ColoringOutput::Red);
            }
            let selected_parent = chain_block.data.get().selected_parent;
            if selected_parent == ZERO_HASH {
                break;
            }
            match self.storage.ghostdag_store.get_data(&selected_parent)? {
                Some(data) => chain_block = ChainBlock { hash: Some(selected_parent), data: ChainBlockData::Stored(data) },
                // Only blocks below the pruning point lose their data
                None => return Ok(ColoringOutput::Red),
            }
        }

        Ok(ColoringOutput::Blue(candidate_blue_anticone_size, candidate_blues_anticone_sizes))
    }

    fn check_blue_candidate_with_chain_block(
        &self,
        new_block_data: &GhostdagData,
        chain_block: &ChainBlock,
        blue_candidate: Hash,
        candidate_blues_anticone_sizes: &mut BlockHashMap<KType>,
        candidate_blue_anticone_size: &mut KType,
    ) -> ConsensusResult<ColoringState> {
        // Every blue of this chain block and below is in the past of the candidate
        if let Some(hash) = chain_block.hash {
            if self.reachability.is_dag_ancestor_of(hash, blue_candidate)? {
                return Ok(ColoringState::Blue);
            }
        }

        for &block in chain_block.data.get().mergeset_blues.iter() {
            if self.reachability.is_dag_ancestor_of(block, blue_candidate)? {
                continue;
            }

            let block_anticone_size = self.blue_anticone_size(block, new_block_data)?;
            candidate_blues_anticone_sizes.insert(block, block_anticone_size);

            *candidate_blue_anticone_size += 1;
            if *candidate_blue_anticone_size > self.k {
                return Ok(ColoringState::Red);
            }
            if block_anticone_size == self.k {
                return Ok(ColoringState::Red);
            }
        }

        Ok(ColoringState::Pending)
    }

    /// Blue anticone size of `block` from the worldview of `context`
    fn blue_anticone_size(&self, block: Hash, context: &GhostdagData) -> ConsensusResult<KType> {
        if let Some(size) = context.blues_anticone_sizes.get(&block) {
            return Ok(*size);
        }
        let mut current = context.selected_parent;
        while current != ZERO_HASH {
            let data = self
                .storage
                .ghostdag_store
                .get_data(&current)?
                .ok_or_else(|| ConsensusError::internal(format!("blue {block} is not in the blue set of its chain")))?;
            if let Some(size) = data.blues_anticone_sizes.get(&block) {
                return Ok(*size);
            }
            current = data.selected_parent;
        }
        Err(ConsensusError::internal(format!("blue {block} is not in the blue set of its chain")))
    }
}

fn first_duplicate(parents: &[Hash]) -> Option<Hash> {
    let mut seen = consensus_core::BlockHashSet::with_capacity(parents.len());
    parents.iter().copied().find(|parent| !seen.insert(*parent))
}
