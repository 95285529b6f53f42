use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{BlockHashMap, BlueWorkType, Hash, KType, ZERO_HASH};

/// GHOSTDAG metadata of a block
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostdagData {
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    pub selected_parent: Hash,
    /// Selected parent first, then the other blues in consensus order
    pub mergeset_blues: Vec<Hash>,
    /// Reds in consensus order
    pub mergeset_reds: Vec<Hash>,
    /// Blue anticone size of each mergeset blue, as seen from this block
    pub blues_anticone_sizes: BlockHashMap<KType>,
}

impl GhostdagData {
    pub fn new(
        blue_score: u64,
        blue_work: BlueWorkType,
        selected_parent: Hash,
        mergeset_blues: Vec<Hash>,
        mergeset_reds: Vec<Hash>,
        blues_anticone_sizes: BlockHashMap<KType>,
    ) -> Self {
        Self { blue_score, blue_work, selected_parent, mergeset_blues, mergeset_reds, blues_anticone_sizes }
    }

    /// Data of the genesis block
    pub fn genesis() -> Self {
        Self::new(0, BlueWorkType::ZERO, ZERO_HASH, Vec::new(), Vec::new(), BlockHashMap::new())
    }

    /// Starts the data of a block whose selected parent is `selected_parent`
    pub fn new_with_selected_parent(selected_parent: Hash, k: KType) -> Self {
        let mut mergeset_blues: Vec<Hash> = Vec::with_capacity(k as usize + 1);
        let mut blues_anticone_sizes: BlockHashMap<KType> = BlockHashMap::with_capacity(k as usize);
        mergeset_blues.push(selected_parent);
        blues_anticone_sizes.insert(selected_parent, 0);
        Self::new(Default::default(), Default::default(), selected_parent, mergeset_blues, Vec::new(), blues_anticone_sizes)
    }

    pub fn mergeset_size(&self) -> usize {
        self.mergeset_blues.len() + self.mergeset_reds.len()
    }

    /// Mergeset blues excluding the selected parent
    pub fn unordered_mergeset_without_selected_parent(&self) -> impl Iterator<Item = Hash> + '_ {
        self.mergeset_blues.iter().skip(1).chain(self.mergeset_reds.iter()).copied()
    }

    pub fn add_blue(&mut self, block: Hash, blue_anticone_size: KType, block_blues_anticone_sizes: &BlockHashMap<KType>) {
        // Add the new blue block to mergeset blues
        self.mergeset_blues.push(block);

        // Get a mut ref to internal anticone size map
        let blues_anticone_sizes = &mut self.blues_anticone_sizes;

        // Insert the new blue block with its blue anticone size to the map
        blues_anticone_sizes.insert(block, blue_anticone_size);

        // Insert/update map entries for blocks affected by this insertion
        for (blue, size) in block_blues_anticone_sizes {
            blues_anticone_sizes.insert(*blue, size + 1);
        }
    }

    pub fn add_red(&mut self, block: Hash) {
        self.mergeset_reds.push(block);
    }

    pub fn finalize_score_and_work(&mut self, blue_score: u64, blue_work: BlueWorkType) {
        self.blue_score = blue_score;
        self.blue_work = blue_work;
    }
}

/// Block ranking by (blue work, hash). Greater blue work ranks higher; on equal
/// work the lexicographically smaller hash ranks higher. Sorting ascending
/// yields consensus order and the maximum is the selected parent.
#[derive(Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SortableBlock {
    pub hash: Hash,
    pub blue_work: BlueWorkType,
}

impl SortableBlock {
    pub fn new(hash: Hash, blue_work: BlueWorkType) -> Self {
        Self { hash, blue_work }
    }
}

impl PartialEq for SortableBlock {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl PartialOrd for SortableBlock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortableBlock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.blue_work.cmp(&other.blue_work).then_with(|| other.hash.cmp(&self.hash))
    }
}
