#![allow(dead_code)]

use consensus::{Consensus, ConsensusApi};
use consensus_core::api::{BlockProcessingResult, ConsensusEvent};
use consensus_core::block::Block;
use consensus_core::config::params::Params;
use consensus_core::config::Config;
use consensus_core::errors::ConsensusResult;
use consensus_core::subnets::SUBNETWORK_ID_NATIVE;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionInput, TransactionOutpoint, TransactionOutput};
use consensus_core::Hash;
use database::{KeyValueStore, MemoryDb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub struct TestConsensus {
    pub consensus: Consensus,
    pub events: UnboundedReceiver<ConsensusEvent>,
    pub db: Arc<dyn KeyValueStore>,
    pub miner: ScriptPublicKey,
    nonce: AtomicU64,
}

impl TestConsensus {
    pub fn new(params: Params) -> Self {
        Self::with_config(Config::new(params))
    }

    pub fn with_config(config: Config) -> Self {
        Self::over_db(config, Arc::new(MemoryDb::new()))
    }

    /// Starts an engine over an existing store
    pub fn over_db(config: Config, db: Arc<dyn KeyValueStore>) -> Self {
        let consensus = Consensus::new(config, db.clone());
        let events = consensus.start().unwrap();
        Self { consensus, events, db, miner: ScriptPublicKey::new(0, vec![0x51]), nonce: AtomicU64::new(0) }
    }

    pub fn genesis(&self) -> Hash {
        self.consensus.config().genesis.hash()
    }

    pub fn base_subsidy(&self) -> u64 {
        self.consensus.config().base_subsidy
    }

    /// Unique coinbase extra data, so that no two blocks share a coinbase id
    fn next_extra_data(&self) -> Vec<u8> {
        self.nonce.fetch_add(1, Ordering::Relaxed).to_le_bytes().to_vec()
    }

    pub fn build_block(&self, parents: &[Hash], transactions: Vec<Transaction>) -> ConsensusResult<Block> {
        self.build_block_paying(parents, transactions, self.miner.clone())
    }

    pub fn build_block_paying(&self, parents: &[Hash], transactions: Vec<Transaction>, payout: ScriptPublicKey) -> ConsensusResult<Block> {
        self.consensus.build_block_with_parents(parents.to_vec(), payout, self.next_extra_data(), transactions)
    }

    pub fn add_block_with_txs(&self, parents: &[Hash], transactions: Vec<Transaction>) -> ConsensusResult<BlockProcessingResult> {
        let block = self.build_block(parents, transactions)?;
        self.consensus.add_block(block)
    }

    pub fn add_block(&self, parents: &[Hash]) -> Hash {
        self.add_block_with_txs(parents, vec![]).unwrap().hash
    }

    /// Mines `count` blocks, each on the previous one, starting on `from`
    pub fn add_chain(&self, from: Hash, count: usize) -> Vec<Hash> {
        let mut chain = Vec::with_capacity(count);
        let mut tip = from;
        for _ in 0..count {
            tip = self.add_block(&[tip]);
            chain.push(tip);
        }
        chain
    }

    pub fn coinbase_outpoint(&self, block: Hash) -> TransactionOutpoint {
        let block = self.consensus.get_block(&block).unwrap().unwrap();
        TransactionOutpoint::new(block.transactions[0].id(), 0)
    }

    pub fn drain_events(&mut self) -> Vec<ConsensusEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// A transaction moving `outpoint` to `payout`, `amount` in total
pub fn spend(outpoint: TransactionOutpoint, amount: u64, payout: ScriptPublicKey) -> Transaction {
    Transaction::new(
        0,
        vec![TransactionInput::new(outpoint, vec![], 0)],
        vec![TransactionOutput::new(amount, payout)],
        0,
        SUBNETWORK_ID_NATIVE,
        0,
        vec![],
    )
}

pub fn script(tag: u8) -> ScriptPublicKey {
    ScriptPublicKey::new(0, vec![0x76, tag])
}
