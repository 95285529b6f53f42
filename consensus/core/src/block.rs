use serde::{Deserialize, Serialize};

use crate::{header::Header, merkle::calc_hash_merkle_root, tx::Transaction, Hash};

/// Complete block structure including header and transactions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self { header, transactions }
    }

    /// Builds a block from its parts, setting the merkle root and the header hash
    pub fn from_parts(mut header: Header, transactions: Vec<Transaction>) -> Self {
        header.hash_merkle_root = calc_hash_merkle_root(transactions.iter());
        header.finalize();
        Self { header, transactions }
    }

    #[inline]
    pub fn hash(&self) -> Hash {
        self.header.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.header.parents.is_empty()
    }

    /// The coinbase, which must be the first transaction of every block
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{ScriptPublicKey, TransactionOutput};

    #[test]
    fn from_parts_commits_to_body() {
        let cb = Transaction::new_coinbase(1, vec![TransactionOutput::new(50, ScriptPublicKey::new(0, vec![1]))], &[]);
        let header = Header::new_finalized(1, vec![Hash::from_u64_word(1)], Hash::zeroed(), Hash::zeroed(), 0, 0x207fffff, 0);
        let block = Block::from_parts(header.clone(), vec![cb.clone()]);
        assert_eq!(block.header.hash_merkle_root, cb.id());
        assert_ne!(block.hash(), header.hash);
        assert!(block.header.is_hash_consistent());
        assert!(block.coinbase().is_some());
        assert!(!block.is_genesis());
    }
}
