use crate::consensus::dag::ReachabilityService;
use crate::consensus::storage::ConsensusStorage;
use consensus_core::errors::{ConsensusResult, RuleError};
use consensus_core::ghostdag::SortableBlock;
use consensus_core::{BlockHashSet, Hash};
use std::collections::VecDeque;

/// Collects the blocks in the anticone of the selected parent that lie in the
/// past of a new block.
pub struct MergesetBuilder<'a> {
    storage: &'a ConsensusStorage,
    reachability: &'a ReachabilityService,
    mergeset_size_limit: u64,
}

impl<'a> MergesetBuilder<'a> {
    pub fn new(storage: &'a ConsensusStorage, reachability: &'a ReachabilityService, mergeset_size_limit: u64) -> Self {
        Self { storage, reachability, mergeset_size_limit }
    }

    /// The mergeset minus the selected parent, sorted in consensus order
    pub fn ordered_mergeset_without_selected_parent(&self, selected_parent: Hash, parents: &[Hash]) -> ConsensusResult<Vec<Hash>> {
        let mut mergeset = BlockHashSet::new();
        let mut queue = VecDeque::new();

        for &parent in parents.iter().filter(|p| **p != selected_parent) {
            if self.reachability.is_dag_ancestor_of(parent, selected_parent)? {
                continue;
            }
            mergeset.insert(parent);
            queue.push_back(parent);
        }
        self.check_size(mergeset.len())?;

        while let Some(current) = queue.pop_front() {
            let Some(current_parents) = self.storage.relations_store.get_parents(&current)? else {
                continue;
            };
            for parent in current_parents {
                if mergeset.contains(&parent) {
                    continue;
                }
                // Pruned blocks are in the past of the selected parent
                if !self.storage.ghostdag_store.has(&parent)? {
                    continue;
                }
                if self.reachability.is_dag_ancestor_of(parent, selected_parent)? {
                    continue;
                }
                mergeset.insert(parent);
                queue.push_back(parent);
                self.check_size(mergeset.len())?;
            }
        }

        let mut sortable = Vec::with_capacity(mergeset.len());
        for hash in mergeset {
            sortable.push(SortableBlock::new(hash, self.storage.ghostdag_store.get_blue_work(&hash)?));
        }
        sortable.sort();
        Ok(sortable.into_iter().map(|s| s.hash).collect())
    }

    /// `size` excludes the selected parent
    fn check_size(&self, size: usize) -> ConsensusResult<()> {
        if size as u64 + 1 > self.mergeset_size_limit {
            return Err(RuleError::AnticoneSizeExceeded { size: size + 1, limit: self.mergeset_size_limit }.into());
        }
        Ok(())
    }
}
