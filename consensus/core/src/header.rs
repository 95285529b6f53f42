use crate::{hashing, BlockHashSet, Hash};
use serde::{Deserialize, Serialize};

/// Block header. The cached `hash` is computed by [`Header::finalize`] and is
/// never part of the hashed content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Cached hash
    pub hash: Hash,
    pub version: u16,
    /// Direct parents, in the order chosen by the block producer
    pub parents: Vec<Hash>,
    pub hash_merkle_root: Hash,
    pub utxo_commitment: Hash,
    /// Timestamp is in milliseconds
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
}

impl Header {
    pub fn new_finalized(
        version: u16,
        parents: Vec<Hash>,
        hash_merkle_root: Hash,
        utxo_commitment: Hash,
        timestamp: u64,
        bits: u32,
        nonce: u64,
    ) -> Self {
        let mut header = Self {
            hash: Default::default(), // Temp init before the finalize below
            version,
            parents,
            hash_merkle_root,
            utxo_commitment,
            timestamp,
            bits,
            nonce,
        };
        header.finalize();
        header
    }

    /// Finalizes the header and recomputes the header hash
    pub fn finalize(&mut self) {
        self.hash = hashing::header::hash(self);
    }

    pub fn direct_parents(&self) -> &[Hash] {
        &self.parents
    }

    /// Returns true if the cached hash matches the header content
    pub fn is_hash_consistent(&self) -> bool {
        self.hash == hashing::header::hash(self)
    }

    /// Returns the first repeated parent, if any
    pub fn duplicate_parent(&self) -> Option<Hash> {
        let mut seen = BlockHashSet::with_capacity(self.parents.len());
        self.parents.iter().copied().find(|parent| !seen.insert(*parent))
    }

    /// WARNING: To be used for test purposes only
    pub fn from_precomputed_hash(hash: Hash, parents: Vec<Hash>) -> Header {
        Header {
            version: crate::constants::BLOCK_VERSION,
            hash,
            parents,
            hash_merkle_root: Default::default(),
            utxo_commitment: Default::default(),
            nonce: 0,
            timestamp: 0,
            bits: 0,
        }
    }
}
