//! Transaction validation for consensus
//!
//! This module validates transactions including:
//! - Input uniqueness and output values, without context
//! - Input presence, coinbase maturity and amounts, against a UTXO view

use consensus_core::errors::{ConsensusResult, RuleError, RuleResult};
use consensus_core::tx::{Transaction, TransactionOutpoint, UtxoEntry};
use consensus_core::utxo::UtxoView;
use std::collections::HashSet;

/// Transaction validator for consensus rules
pub struct TransactionValidator {
    coinbase_maturity: u64,
}

impl TransactionValidator {
    pub fn new(coinbase_maturity: u64) -> Self {
        Self { coinbase_maturity }
    }

    /// Validate transaction with context-free checks
    pub fn validate_tx_in_isolation(&self, tx: &Transaction) -> RuleResult<()> {
        let tx_id = tx.id();
        let mut inputs = HashSet::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            if !inputs.insert(input.previous_outpoint) {
                return Err(RuleError::DuplicateTxInput(tx_id, input.previous_outpoint));
            }
        }
        if let Some(index) = tx.outputs.iter().position(|output| output.value == 0) {
            return Err(RuleError::ZeroValueOutput(tx_id, index));
        }
        Ok(())
    }

    /// Validate a non-coinbase transaction against `utxo_view` at DAA score
    /// `daa_score`. Returns the spent entries, in input order, and the fee.
    pub fn validate_populated_transaction(
        &self,
        tx: &Transaction,
        utxo_view: &impl UtxoView,
        daa_score: u64,
    ) -> ConsensusResult<(Vec<UtxoEntry>, u64)> {
        let mut entries = Vec::with_capacity(tx.inputs.len());
        let mut total_in: u64 = 0;
        for input in &tx.inputs {
            let outpoint = input.previous_outpoint;
            let entry = utxo_view.get(&outpoint)?.ok_or(RuleError::DoubleSpend(outpoint))?;
            if entry.is_coinbase && entry.block_daa_score.saturating_add(self.coinbase_maturity) > daa_score {
                return Err(RuleError::ImmatureCoinbaseSpend { outpoint, created_at: entry.block_daa_score, daa_score }.into());
            }
            total_in = total_in.saturating_add(entry.amount);
            entries.push(entry);
        }

        let total_out = tx.total_output_value().unwrap_or(u64::MAX);
        if total_out > total_in {
            return Err(RuleError::InsufficientInputs { tx: tx.id(), inputs: total_in, outputs: total_out }.into());
        }
        Ok((entries, total_in - total_out))
    }

    /// Checks that none of the outputs of `tx` is already live in `utxo_view`
    pub fn check_outputs_are_new(&self, tx: &Transaction, utxo_view: &impl UtxoView) -> ConsensusResult<()> {
        let tx_id = tx.id();
        for index in 0..tx.outputs.len() {
            let outpoint = TransactionOutpoint::new(tx_id, index as u32);
            if utxo_view.get(&outpoint)?.is_some() {
                return Err(RuleError::OutputAlreadyExists(outpoint).into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::errors::ConsensusError;
    use consensus_core::subnets::SUBNETWORK_ID_NATIVE;
    use consensus_core::tx::{ScriptPublicKey, TransactionInput, TransactionOutput};
    use consensus_core::utxo::UtxoCollection;
    use consensus_core::Hash;

    fn spk() -> ScriptPublicKey {
        ScriptPublicKey::new(0, vec![0x51])
    }

    fn spend(outpoints: &[TransactionOutpoint], outputs: &[u64]) -> Transaction {
        Transaction::new(
            0,
            outpoints.iter().map(|op| TransactionInput::new(*op, vec![], 0)).collect(),
            outputs.iter().map(|v| TransactionOutput::new(*v, spk())).collect(),
            0,
            SUBNETWORK_ID_NATIVE,
            0,
            vec![],
        )
    }

    fn view() -> UtxoCollection {
        [
            (TransactionOutpoint::new(Hash::from_u64_word(1), 0), UtxoEntry::new(100, spk(), 5, false)),
            (TransactionOutpoint::new(Hash::from_u64_word(2), 0), UtxoEntry::new(50, spk(), 5, true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_isolation_checks() {
        let validator = TransactionValidator::new(10);
        let op = TransactionOutpoint::new(Hash::from_u64_word(1), 0);
        assert!(matches!(validator.validate_tx_in_isolation(&spend(&[op, op], &[1])), Err(RuleError::DuplicateTxInput(_, o)) if o == op));
        assert!(matches!(validator.validate_tx_in_isolation(&spend(&[op], &[1, 0])), Err(RuleError::ZeroValueOutput(_, 1))));
        assert!(validator.validate_tx_in_isolation(&spend(&[op], &[1])).is_ok());
    }

    #[test]
    fn test_populated_checks() {
        let validator = TransactionValidator::new(10);
        let utxos = view();
        let regular = TransactionOutpoint::new(Hash::from_u64_word(1), 0);
        let coinbase = TransactionOutpoint::new(Hash::from_u64_word(2), 0);
        let missing = TransactionOutpoint::new(Hash::from_u64_word(3), 0);

        let (entries, fee) = validator.validate_populated_transaction(&spend(&[regular], &[90]), &utxos, 6).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(fee, 10);

        let err = validator.validate_populated_transaction(&spend(&[missing], &[1]), &utxos, 6).unwrap_err();
        assert!(matches!(err, ConsensusError::Rule(RuleError::DoubleSpend(o)) if o == missing));

        let err = validator.validate_populated_transaction(&spend(&[regular], &[101]), &utxos, 6).unwrap_err();
        assert!(matches!(err, ConsensusError::Rule(RuleError::InsufficientInputs { inputs: 100, outputs: 101, .. })));

        let err = validator.validate_populated_transaction(&spend(&[coinbase], &[1]), &utxos, 14).unwrap_err();
        assert!(matches!(err, ConsensusError::Rule(RuleError::ImmatureCoinbaseSpend { created_at: 5, daa_score: 14, .. })));
        assert!(validator.validate_populated_transaction(&spend(&[coinbase], &[1]), &utxos, 15).is_ok());
    }

    #[test]
    fn test_output_collision() {
        let validator = TransactionValidator::new(10);
        let tx = spend(&[TransactionOutpoint::new(Hash::from_u64_word(1), 0)], &[5]);
        let mut utxos = view();
        assert!(validator.check_outputs_are_new(&tx, &utxos).is_ok());
        utxos.insert(TransactionOutpoint::new(tx.id(), 0), UtxoEntry::new(5, spk(), 1, false));
        let err = validator.check_outputs_are_new(&tx, &utxos).unwrap_err();
        assert!(matches!(err, ConsensusError::Rule(RuleError::OutputAlreadyExists(_))));
    }
}
