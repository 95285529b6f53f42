//! Body processor for consensus
//!
//! This module computes the UTXO diff of a block from its mergeset and its
//! own transactions.

use crate::consensus::ghostdag::GhostdagManager;
use crate::consensus::storage::ConsensusStorage;
use crate::consensus::validation::TransactionValidator;
use crate::process::coinbase::CoinbaseManager;
use consensus_core::block::Block;
use consensus_core::errors::{ConsensusError, ConsensusResult};
use consensus_core::ghostdag::GhostdagData;
use consensus_core::tx::{Transaction, TransactionId};
use consensus_core::utxo::{ComposedUtxoView, UtxoDiff, UtxoView};
use database::errors::StoreResultExtensions;
use std::sync::Arc;
use tracing::debug;

/// Transactions accepted against some view, with the diff they produce
struct AcceptedTransactions {
    diff: UtxoDiff,
    ids: Vec<TransactionId>,
    fees: u64,
}

/// Body processor for transaction processing
pub struct BodyProcessor {
    storage: Arc<ConsensusStorage>,
    ghostdag_manager: Arc<GhostdagManager>,
    transaction_validator: Arc<TransactionValidator>,
    coinbase_manager: CoinbaseManager,
}

impl BodyProcessor {
    pub fn new(
        storage: Arc<ConsensusStorage>,
        ghostdag_manager: Arc<GhostdagManager>,
        transaction_validator: Arc<TransactionValidator>,
        coinbase_manager: CoinbaseManager,
    ) -> Self {
        Self { storage, ghostdag_manager, transaction_validator, coinbase_manager }
    }

    /// Computes the UTXO diff a block applies on top of its selected parent's
    /// state, given `base` as that state. Returns the diff and the accepted
    /// transaction ids in acceptance order.
    ///
    /// Merged blocks are accepted whole or not at all. The block's own
    /// transactions must all be valid.
    pub fn calculate_utxo_diff(
        &self,
        block: &Block,
        ghostdag_data: &GhostdagData,
        base: &impl UtxoView,
    ) -> ConsensusResult<(UtxoDiff, Vec<TransactionId>)> {
        let daa_score = ghostdag_data.blue_score;
        let (mut diff, mut accepted) = self.accept_mergeset(ghostdag_data, base)?;

        let own = self.accept_transactions(&block.transactions, &ComposedUtxoView::new(base, &diff), daa_score)?;
        if let Some(coinbase) = block.coinbase() {
            self.coinbase_manager.validate_coinbase_amount(coinbase, daa_score, own.fees)?;
        }

        diff.with_diff_in_place(&own.diff)?;
        accepted.extend(own.ids);
        Ok((diff, accepted))
    }

    /// Accepts the mergeset (selected parent excluded) in consensus order on top of `base`
    pub fn accept_mergeset(&self, ghostdag_data: &GhostdagData, base: &impl UtxoView) -> ConsensusResult<(UtxoDiff, Vec<TransactionId>)> {
        let daa_score = ghostdag_data.blue_score;
        let mut diff = UtxoDiff::default();
        let mut accepted = Vec::new();

        for merged in self.ghostdag_manager.ordered_mergeset_without_selected_parent(ghostdag_data)? {
            let merged_block = self.storage.block_store.get_block(&merged).or_not_found(|| format!("block {merged}"))?;
            match self.accept_transactions(&merged_block.transactions, &ComposedUtxoView::new(base, &diff), daa_score) {
                Ok(block_acceptance) => {
                    diff.with_diff_in_place(&block_acceptance.diff)?;
                    accepted.extend(block_acceptance.ids);
                }
                Err(ConsensusError::Rule(err)) => {
                    debug!("merged block {} is not accepted: {}", merged, err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok((diff, accepted))
    }

    /// Total fees paid by non-coinbase `transactions` on top of `view`
    pub fn calculate_fees(&self, transactions: &[Transaction], view: &impl UtxoView, daa_score: u64) -> ConsensusResult<u64> {
        Ok(self.accept_transactions(transactions, view, daa_score)?.fees)
    }

    fn accept_transactions(
        &self,
        transactions: &[Transaction],
        view: &impl UtxoView,
        daa_score: u64,
    ) -> ConsensusResult<AcceptedTransactions> {
        let mut diff = UtxoDiff::default();
        let mut ids = Vec::with_capacity(transactions.len());
        let mut fees: u64 = 0;

        for tx in transactions {
            let current = ComposedUtxoView::new(view, &diff);
            let entries = if tx.is_coinbase() {
                Vec::new()
            } else {
                let (entries, fee) = self.transaction_validator.validate_populated_transaction(tx, &current, daa_score)?;
                fees = fees.saturating_add(fee);
                entries
            };
            self.transaction_validator.check_outputs_are_new(tx, &current)?;
            diff.add_transaction(tx, &entries, daa_score)?;
            ids.push(tx.id());
        }
        Ok(AcceptedTransactions { diff, ids, fees })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::dag::ReachabilityService;
    use consensus_core::config::params::Params;
    use consensus_core::constants::BLOCK_VERSION;
    use consensus_core::errors::RuleError;
    use consensus_core::header::Header;
    use consensus_core::subnets::SUBNETWORK_ID_NATIVE;
    use consensus_core::tx::{ScriptPublicKey, TransactionInput, TransactionOutpoint, TransactionOutput, UtxoEntry};
    use consensus_core::utxo::UtxoCollection;
    use consensus_core::Hash;
    use database::MemoryDb;

    fn processor(params: &Params) -> BodyProcessor {
        let storage = ConsensusStorage::new(Arc::new(MemoryDb::new()), 64);
        let reachability = Arc::new(ReachabilityService::new(storage.clone()));
        let ghostdag =
            Arc::new(GhostdagManager::new(params.ghostdag_k, params.mergeset_size_limit, storage.clone(), reachability));
        BodyProcessor::new(
            storage,
            ghostdag,
            Arc::new(TransactionValidator::new(params.coinbase_maturity)),
            CoinbaseManager::new(params),
        )
    }

    fn spk() -> ScriptPublicKey {
        ScriptPublicKey::new(0, vec![0x51])
    }

    fn spend(outpoint: TransactionOutpoint, amount: u64) -> Transaction {
        Transaction::new(
            0,
            vec![TransactionInput::new(outpoint, vec![], 0)],
            vec![TransactionOutput::new(amount, spk())],
            0,
            SUBNETWORK_ID_NATIVE,
            0,
            vec![],
        )
    }

    fn block(txs: Vec<Transaction>) -> Block {
        let header = Header::new_finalized(BLOCK_VERSION, vec![Hash::from_u64_word(1)], Hash::zeroed(), Hash::zeroed(), 0, 0, 0);
        Block::from_parts(header, txs)
    }

    fn ghostdag_data(blue_score: u64) -> GhostdagData {
        let mut data = GhostdagData::genesis();
        data.blue_score = blue_score;
        data.selected_parent = Hash::from_u64_word(1);
        data
    }

    #[test]
    fn test_own_transactions_and_fees() {
        let params = Params::simnet();
        let processor = processor(&params);
        let funding = TransactionOutpoint::new(Hash::from_u64_word(50), 0);
        let base: UtxoCollection = [(funding, UtxoEntry::new(1_000, spk(), 1, false))].into_iter().collect();

        let tx = spend(funding, 900);
        let coinbase = processor.coinbase_manager.build_coinbase(5, 100, &spk(), b"own");
        let b = block(vec![coinbase.clone(), tx.clone()]);

        let (diff, accepted) = processor.calculate_utxo_diff(&b, &ghostdag_data(5), &base).unwrap();
        assert_eq!(accepted, vec![coinbase.id(), tx.id()]);
        assert!(diff.remove.contains(&funding));
        assert_eq!(diff.add.get(&TransactionOutpoint::new(tx.id(), 0)).map(|e| e.amount), Some(900));
        assert_eq!(diff.amount_delta(), params.base_subsidy as i128);
    }

    #[test]
    fn test_coinbase_amount_must_match() {
        let params = Params::simnet();
        let processor = processor(&params);
        let greedy = processor.coinbase_manager.build_coinbase(5, 1, &spk(), b"greedy");
        let err = processor.calculate_utxo_diff(&block(vec![greedy]), &ghostdag_data(5), &UtxoCollection::new()).unwrap_err();
        assert!(matches!(err, ConsensusError::Rule(RuleError::InvalidCoinbaseAmount { .. })));
    }

    #[test]
    fn test_invalid_own_transaction_rejects_block() {
        let params = Params::simnet();
        let processor = processor(&params);
        let missing = TransactionOutpoint::new(Hash::from_u64_word(77), 0);
        let coinbase = processor.coinbase_manager.build_coinbase(5, 0, &spk(), b"x");
        let err = processor
            .calculate_utxo_diff(&block(vec![coinbase, spend(missing, 1)]), &ghostdag_data(5), &UtxoCollection::new())
            .unwrap_err();
        assert!(matches!(err, ConsensusError::Rule(RuleError::DoubleSpend(op)) if op == missing));
    }

    #[test]
    fn test_chained_spend_within_block() {
        let params = Params::simnet();
        let processor = processor(&params);
        let funding = TransactionOutpoint::new(Hash::from_u64_word(50), 0);
        let base: UtxoCollection = [(funding, UtxoEntry::new(1_000, spk(), 1, false))].into_iter().collect();

        let first = spend(funding, 1_000);
        let second = spend(TransactionOutpoint::new(first.id(), 0), 990);
        let coinbase = processor.coinbase_manager.build_coinbase(5, 10, &spk(), b"chain");

        let (diff, _) =
            processor.calculate_utxo_diff(&block(vec![coinbase, first.clone(), second]), &ghostdag_data(5), &base).unwrap();
        assert!(!diff.add.contains(&TransactionOutpoint::new(first.id(), 0)));
        assert_eq!(processor.calculate_fees(&[spend(funding, 400)], &base, 5).unwrap(), 600);
    }
}
