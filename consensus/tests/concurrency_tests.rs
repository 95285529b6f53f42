mod common;

use common::TestConsensus;
use consensus::ConsensusApi;
use consensus_core::config::params::Params;
use consensus_core::tx::TransactionOutpoint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[test]
fn test_reads_stay_consistent_while_blocks_are_added() {
    let tc = TestConsensus::new(Params::simnet());
    let consensus = &tc.consensus;
    let reward = tc.base_subsidy();
    let genesis = tc.genesis();
    let stop = AtomicBool::new(false);
    let done = &stop;

    thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let mut reads = 0u64;
                    loop {
                        let finished = done.load(Ordering::Acquire);
                        let before = consensus.get_coin_supply().unwrap();
                        let sink = consensus.get_virtual_selected_parent_hash().unwrap();
                        let after = consensus.get_coin_supply().unwrap();

                        // A single chain grows, so supply is the blue score of the sink times the reward
                        let blue_score = consensus.get_block_ghostdag_data(&sink).unwrap().unwrap().blue_score;
                        assert!(before <= blue_score * reward && blue_score * reward <= after);
                        if before == after {
                            assert_eq!(before, blue_score * reward);
                        }

                        if sink != genesis {
                            let block = consensus.get_block(&sink).unwrap().unwrap();
                            let coinbase = TransactionOutpoint::new(block.transactions[0].id(), 0);
                            let entry = consensus.get_utxo_by_outpoint(&coinbase).unwrap().unwrap();
                            assert_eq!(entry.amount, reward);
                        }

                        reads += 1;
                        if finished {
                            return reads;
                        }
                    }
                })
            })
            .collect();

        let mut tip = genesis;
        for i in 0..60u64 {
            let block = consensus.build_block_with_parents(vec![tip], tc.miner.clone(), i.to_le_bytes().to_vec(), vec![]).unwrap();
            tip = consensus.add_block(block).unwrap().hash;
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
    });

    assert_eq!(tc.consensus.get_coin_supply().unwrap(), 60 * reward);
}
