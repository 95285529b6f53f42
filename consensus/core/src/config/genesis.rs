use serde::{Deserialize, Serialize};

use crate::{
    block::Block,
    constants::BLOCK_VERSION,
    header::Header,
    tx::Transaction,
    Hash, ZERO_HASH,
};
use kash_multiset::Multiset;

/// The constants uniquely representing the genesis block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBlock {
    pub version: u16,
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
    /// Extra data carried by the genesis coinbase after the blue score prefix
    pub coinbase_extra_data: Vec<u8>,
}

impl GenesisBlock {
    pub fn new(timestamp: u64, bits: u32, nonce: u64, coinbase_extra_data: &[u8]) -> Self {
        Self { version: BLOCK_VERSION, timestamp, bits, nonce, coinbase_extra_data: coinbase_extra_data.to_vec() }
    }

    /// The genesis coinbase pays nothing, so the genesis UTXO set is empty
    pub fn build_genesis_transactions(&self) -> Vec<Transaction> {
        vec![Transaction::new_coinbase(0, Vec::new(), &self.coinbase_extra_data)]
    }

    pub fn build_block(&self) -> Block {
        let header = Header::new_finalized(
            self.version,
            Vec::new(),
            ZERO_HASH,
            Multiset::new().finalize(),
            self.timestamp,
            self.bits,
            self.nonce,
        );
        Block::from_parts(header, self.build_genesis_transactions())
    }

    pub fn hash(&self) -> Hash {
        self.build_block().hash()
    }
}

impl From<&GenesisBlock> for Block {
    fn from(genesis: &GenesisBlock) -> Self {
        genesis.build_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_deterministic_and_commits_to_empty_set() {
        let genesis = GenesisBlock::new(1_700_000_000_000, 0x207fffff, 0, b"genesis");
        let block = genesis.build_block();
        assert_eq!(block.hash(), genesis.hash());
        assert!(block.is_genesis());
        assert_eq!(block.header.utxo_commitment, Multiset::new().finalize());
        assert_eq!(block.transactions.len(), 1);
        assert!(block.transactions[0].outputs.is_empty());
        assert_ne!(GenesisBlock::new(1_700_000_000_000, 0x207fffff, 0, b"other").hash(), block.hash());
    }
}
