use crate::{tx::Transaction, Hash};
use kash_hashes::{hashers::MerkleBranchHash, HasherBase};

/// Merkle tree over transaction ids. Odd levels duplicate their last node.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// Nodes at each level of the tree (leaves at level 0)
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Creates a new Merkle tree from a list of leaf hashes
    pub fn from_hashes(hashes: Vec<Hash>) -> Self {
        if hashes.is_empty() {
            return Self { levels: vec![] };
        }

        let mut levels = vec![hashes];
        loop {
            let current_level = &levels[levels.len() - 1];
            if current_level.len() <= 1 {
                break;
            }
            let next_level: Vec<Hash> = current_level
                .chunks(2)
                .map(|chunk| {
                    let left = chunk[0];
                    let right = chunk.get(1).copied().unwrap_or(left);
                    Self::hash_pair(&left, &right)
                })
                .collect();
            levels.push(next_level);
        }

        Self { levels }
    }

    /// Returns the Merkle root hash. An empty tree has the zero hash as root.
    pub fn root(&self) -> Hash {
        self.levels.last().and_then(|level| level.first().copied()).unwrap_or_default()
    }

    fn hash_pair(left: &Hash, right: &Hash) -> Hash {
        let mut hasher = MerkleBranchHash::new();
        hasher.update(left).update(right);
        hasher.finalize()
    }
}

/// Computes the merkle root committed to by a block header. Ids are always
/// recomputed from the transaction content.
pub fn calc_hash_merkle_root<'a>(txs: impl ExactSizeIterator<Item = &'a Transaction>) -> Hash {
    MerkleTree::from_hashes(txs.map(Transaction::id).collect()).root()
}
