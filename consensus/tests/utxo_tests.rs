mod common;

use common::{script, spend, TestConsensus};
use consensus::ConsensusApi;
use consensus_core::api::ConsensusEvent;
use consensus_core::block::Block;
use consensus_core::config::params::Params;
use consensus_core::errors::{ConsensusError, RuleError};
use consensus_core::tx::TransactionOutpoint;

#[test]
fn test_supply_matches_rewards() {
    let mut tc = TestConsensus::new(Params::simnet());
    let reward = tc.base_subsidy();
    let chain = tc.add_chain(tc.genesis(), 100);

    assert_eq!(tc.consensus.get_coin_supply().unwrap(), 100 * reward);
    assert_eq!(tc.consensus.get_virtual_selected_parent_hash().unwrap(), chain[99]);
    assert_eq!(tc.consensus.get_block_count().unwrap(), 101);

    let mut live_total = 0;
    for block in &chain {
        let entry = tc.consensus.get_utxo_by_outpoint(&tc.coinbase_outpoint(*block)).unwrap().unwrap();
        assert!(entry.is_coinbase);
        live_total += entry.amount;
    }
    assert_eq!(live_total, tc.consensus.get_coin_supply().unwrap());

    // The virtual UTXO set is the state of the sink
    let sink = tc.consensus.get_block(&chain[99]).unwrap().unwrap();
    assert_eq!(tc.consensus.get_virtual_utxo_commitment().unwrap(), sink.header.utxo_commitment);

    let events = tc.drain_events();
    assert_eq!(events.len(), 200);
    assert_eq!(events[0], ConsensusEvent::BlockAdded { hash: chain[0] });
    assert!(matches!(&events[1], ConsensusEvent::VirtualChanged { sink, added, .. } if *sink == chain[0] && added == &vec![chain[0]]));
}

#[test]
fn test_spend_mature_coinbase() {
    let tc = TestConsensus::new(Params::simnet());
    let reward = tc.base_subsidy();
    let chain = tc.add_chain(tc.genesis(), 11);
    let funding = tc.coinbase_outpoint(chain[0]);

    let tx = spend(funding, reward - 1_000, script(7));
    let result = tc.add_block_with_txs(&[chain[10]], vec![tx.clone()]).unwrap();
    assert!(result.accepted_transaction_ids.contains(&tx.id()));

    assert_eq!(tc.consensus.get_utxo_by_outpoint(&funding).unwrap(), None);
    let created = tc.consensus.get_utxo_by_outpoint(&TransactionOutpoint::new(tx.id(), 0)).unwrap().unwrap();
    assert_eq!(created.amount, reward - 1_000);
    assert_eq!(created.block_daa_score, 12);

    // The fee moved into the coinbase, so the supply only grew by the subsidy
    let coinbase = tc.consensus.get_utxo_by_outpoint(&tc.coinbase_outpoint(result.hash)).unwrap().unwrap();
    assert_eq!(coinbase.amount, reward + 1_000);
    assert_eq!(tc.consensus.get_coin_supply().unwrap(), 12 * reward);
}

#[test]
fn test_immature_coinbase_spend_is_rejected() {
    let tc = TestConsensus::new(Params::simnet());
    let reward = tc.base_subsidy();
    let chain = tc.add_chain(tc.genesis(), 5);
    let funding = tc.coinbase_outpoint(chain[0]);
    let tx = spend(funding, reward, script(7));

    let err = tc.build_block(&[chain[4]], vec![tx.clone()]).unwrap_err();
    assert!(matches!(err, ConsensusError::Rule(RuleError::ImmatureCoinbaseSpend { created_at: 1, daa_score: 6, .. })));

    let template = tc.build_block(&[chain[4]], vec![]).unwrap();
    let mut transactions = template.transactions.clone();
    transactions.push(tx);
    let block = Block::from_parts(template.header.clone(), transactions);
    let err = tc.consensus.add_block(block).unwrap_err();
    assert!(matches!(err, ConsensusError::Rule(RuleError::ImmatureCoinbaseSpend { .. })));
    assert_eq!(tc.consensus.get_virtual_selected_parent_hash().unwrap(), chain[4]);
}

#[test]
fn test_missing_output_is_a_double_spend() {
    let tc = TestConsensus::new(Params::simnet());
    let reward = tc.base_subsidy();
    let chain = tc.add_chain(tc.genesis(), 11);
    let funding = tc.coinbase_outpoint(chain[0]);

    tc.add_block_with_txs(&[chain[10]], vec![spend(funding, reward, script(1))]).unwrap();
    let tip = tc.consensus.get_virtual_selected_parent_hash().unwrap();
    let err = tc.add_block_with_txs(&[tip], vec![spend(funding, reward, script(2))]).unwrap_err();
    assert!(matches!(err, ConsensusError::Rule(RuleError::DoubleSpend(op)) if op == funding));
}
