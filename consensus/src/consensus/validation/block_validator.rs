//! Block validation for consensus
//!
//! This module validates complete blocks including:
//! - Header checks delegated to the header validator
//! - Coinbase placement and payload
//! - Merkle root
//! - Context-free transaction checks

use super::header_validator::HeaderValidator;
use super::transaction_validator::TransactionValidator;
use consensus_core::block::Block;
use consensus_core::constants::COINBASE_PAYLOAD_BLUE_SCORE_LEN;
use consensus_core::errors::{RuleError, RuleResult};
use consensus_core::merkle::calc_hash_merkle_root;
use consensus_core::tx::COINBASE_TRANSACTION_INDEX;
use std::sync::Arc;

/// Block validator for consensus rules
pub struct BlockValidator {
    header_validator: HeaderValidator,
    transaction_validator: Arc<TransactionValidator>,
}

impl BlockValidator {
    pub fn new(header_validator: HeaderValidator, transaction_validator: Arc<TransactionValidator>) -> Self {
        Self { header_validator, transaction_validator }
    }

    /// All checks that need nothing but the block itself
    pub fn validate_block_in_isolation(&self, block: &Block) -> RuleResult<()> {
        self.header_validator.validate_header_in_isolation(&block.header)?;
        self.validate_body_in_isolation(block)
    }

    pub fn validate_body_in_isolation(&self, block: &Block) -> RuleResult<()> {
        self.validate_coinbase(block)?;

        let expected = calc_hash_merkle_root(block.transactions.iter());
        if expected != block.header.hash_merkle_root {
            return Err(RuleError::BadMerkleRoot(expected, block.header.hash_merkle_root));
        }

        for tx in &block.transactions {
            self.transaction_validator.validate_tx_in_isolation(tx)?;
        }
        Ok(())
    }

    /// Validate coinbase transaction placement and shape
    pub fn validate_coinbase(&self, block: &Block) -> RuleResult<()> {
        let Some(coinbase) = block.transactions.get(COINBASE_TRANSACTION_INDEX) else {
            return Err(RuleError::NoTransactions);
        };
        if !coinbase.is_coinbase() {
            return Err(RuleError::FirstTxNotCoinbase);
        }
        if !coinbase.inputs.is_empty() {
            return Err(RuleError::CoinbaseHasInputs);
        }
        if block.transactions.iter().skip(1).any(|tx| tx.is_coinbase()) {
            return Err(RuleError::MultipleCoinbases);
        }
        if coinbase.payload.len() < COINBASE_PAYLOAD_BLUE_SCORE_LEN {
            return Err(RuleError::InvalidPayload(format!(
                "payload of {} bytes is shorter than the {} byte blue score prefix",
                coinbase.payload.len(),
                COINBASE_PAYLOAD_BLUE_SCORE_LEN
            )));
        }
        Ok(())
    }

    /// The coinbase must commit to the blue score assigned to its block
    pub fn validate_coinbase_blue_score(&self, block: &Block, blue_score: u64) -> RuleResult<()> {
        match block.coinbase().and_then(|cb| cb.coinbase_blue_score()) {
            Some(score) if score == blue_score => Ok(()),
            found => Err(RuleError::InvalidPayload(format!("coinbase commits to blue score {found:?}, expected {blue_score}"))),
        }
    }
}
