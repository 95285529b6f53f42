//! Coinbase transaction processing
//!
//! This module handles the emission schedule and coinbase transaction
//! creation and validation.

use consensus_core::config::params::Params;
use consensus_core::errors::{RuleError, RuleResult};
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutput};

/// Coinbase transaction processor
#[derive(Clone)]
pub struct CoinbaseManager {
    base_subsidy: u64,
    subsidy_halving_interval: u64,
}

impl CoinbaseManager {
    pub fn new(params: &Params) -> Self {
        Self { base_subsidy: params.base_subsidy, subsidy_halving_interval: params.subsidy_halving_interval.max(1) }
    }

    /// Block subsidy at DAA score `daa_score`, halving every interval
    pub fn calc_block_subsidy(&self, daa_score: u64) -> u64 {
        let halvings = daa_score / self.subsidy_halving_interval;
        if halvings >= 64 {
            0
        } else {
            self.base_subsidy >> halvings
        }
    }

    /// Create the coinbase of a block with blue score `blue_score` paying subsidy and `fees`
    pub fn build_coinbase(&self, blue_score: u64, fees: u64, payout_script: &ScriptPublicKey, extra_data: &[u8]) -> Transaction {
        let reward = self.calc_block_subsidy(blue_score).saturating_add(fees);
        let outputs = if reward > 0 { vec![TransactionOutput::new(reward, payout_script.clone())] } else { vec![] };
        Transaction::new_coinbase(blue_score, outputs, extra_data)
    }

    /// Validate that the coinbase pays exactly subsidy plus fees
    pub fn validate_coinbase_amount(&self, coinbase: &Transaction, daa_score: u64, fees: u64) -> RuleResult<()> {
        let expected = self.calc_block_subsidy(daa_score).saturating_add(fees);
        let found = coinbase.total_output_value().unwrap_or(u64::MAX);
        if found != expected {
            return Err(RuleError::InvalidCoinbaseAmount { expected, found });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> CoinbaseManager {
        let mut params = Params::simnet();
        params.base_subsidy = 50_000_000;
        params.subsidy_halving_interval = 210_000;
        CoinbaseManager::new(&params)
    }

    #[test]
    fn test_calculate_block_subsidy() {
        let manager = manager();
        assert_eq!(manager.calc_block_subsidy(0), 50_000_000);
        assert_eq!(manager.calc_block_subsidy(209_999), 50_000_000);
        assert_eq!(manager.calc_block_subsidy(210_000), 25_000_000);
        assert_eq!(manager.calc_block_subsidy(420_000), 12_500_000);
        assert_eq!(manager.calc_block_subsidy(210_000 * 64), 0);
    }

    #[test]
    fn test_build_and_validate_coinbase() {
        let manager = manager();
        let miner = ScriptPublicKey::new(0, vec![1, 2, 3, 4]);
        let coinbase = manager.build_coinbase(100, 1000, &miner, b"miner");

        assert!(coinbase.is_coinbase());
        assert!(coinbase.inputs.is_empty());
        assert_eq!(coinbase.outputs[0].value, 50_000_000 + 1000);
        assert_eq!(coinbase.outputs[0].script_public_key, miner);
        assert_eq!(coinbase.coinbase_blue_score(), Some(100));

        assert!(manager.validate_coinbase_amount(&coinbase, 100, 1000).is_ok());
        assert_eq!(
            manager.validate_coinbase_amount(&coinbase, 100, 0),
            Err(RuleError::InvalidCoinbaseAmount { expected: 50_000_000, found: 50_001_000 })
        );
    }

    #[test]
    fn test_zero_reward_has_no_outputs() {
        let mut params = Params::simnet();
        params.base_subsidy = 0;
        let coinbase = CoinbaseManager::new(&params).build_coinbase(5, 0, &ScriptPublicKey::default(), &[]);
        assert!(coinbase.outputs.is_empty());
    }
}
