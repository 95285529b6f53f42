//! Consensus module for BlockDAG-based blockchain
//!
//! This module wires the stores, the GHOSTDAG engine, the validators and the
//! processing pipeline into [`Consensus`], the engine façade. All consensus
//! state sits behind a single lock: blocks are processed one at a time under
//! the write lock, queries take the read lock.

pub mod dag;
pub mod ghostdag;
pub mod storage;
pub mod types;
pub mod validation;

use crate::api::ConsensusApi;
use crate::pipeline::{BlockProcessor, BodyProcessor, VirtualProcessor};
use crate::process::{BlockTemplateBuilder, CoinbaseManager, PruningConfig, PruningManager, TemplateRequest};
use consensus_core::api::{BlockProcessingResult, ConsensusEvent, LifecycleState};
use consensus_core::block::Block;
use consensus_core::config::Config;
use consensus_core::errors::{ConsensusError, ConsensusResult};
use consensus_core::ghostdag::GhostdagData;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutpoint, UtxoEntry};
use consensus_core::Hash;
use consensus_pow::State;
use dag::ReachabilityService;
use database::stores::VirtualState;
use database::KeyValueStore;
use ghostdag::GhostdagManager;
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use storage::ConsensusStorage;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};
use validation::{BlockValidator, HeaderValidator, TransactionValidator};

/// State guarded by the consensus lock
struct ConsensusState {
    lifecycle: LifecycleState,
    events: Option<UnboundedSender<ConsensusEvent>>,
    /// Loaded by `start`
    virtual_state: Option<VirtualState>,
}

impl ConsensusState {
    fn transition(&mut self, to: LifecycleState) -> ConsensusResult<()> {
        if !self.lifecycle.can_transition_to(to) {
            return Err(ConsensusError::InvalidLifecycleTransition { from: self.lifecycle, to });
        }
        self.lifecycle = to;
        Ok(())
    }

    fn virtual_state(&self) -> ConsensusResult<&VirtualState> {
        self.virtual_state.as_ref().ok_or_else(|| ConsensusError::internal("virtual state is not loaded"))
    }
}

/// The consensus engine
pub struct Consensus {
    config: Arc<Config>,
    storage: Arc<ConsensusStorage>,
    block_processor: BlockProcessor,
    virtual_processor: Arc<VirtualProcessor>,
    pruning_manager: Arc<PruningManager>,
    template_builder: BlockTemplateBuilder,
    state: RwLock<ConsensusState>,
}

impl Consensus {
    /// Builds an engine over `db`. Nothing is read or written before [`Consensus::start`].
    pub fn new(config: Config, db: Arc<dyn KeyValueStore>) -> Self {
        let config = Arc::new(config);
        let params = &config.params;
        let storage = ConsensusStorage::new(db, config.cache_size);
        let reachability = Arc::new(ReachabilityService::new(storage.clone()));
        let ghostdag_manager = Arc::new(GhostdagManager::new(
            params.ghostdag_k,
            params.mergeset_size_limit,
            storage.clone(),
            reachability.clone(),
        ));

        let transaction_validator = Arc::new(TransactionValidator::new(params.coinbase_maturity));
        let block_validator = Arc::new(BlockValidator::new(HeaderValidator::new(params), transaction_validator.clone()));
        let coinbase_manager = CoinbaseManager::new(params);

        let body_processor = Arc::new(BodyProcessor::new(
            storage.clone(),
            ghostdag_manager.clone(),
            transaction_validator,
            coinbase_manager.clone(),
        ));
        let virtual_processor = Arc::new(VirtualProcessor::new(
            storage.clone(),
            ghostdag_manager.clone(),
            reachability.clone(),
            params.max_block_parents,
        ));
        let genesis = params.genesis.build_block();
        let pruning_manager = Arc::new(PruningManager::new(
            PruningConfig::from(config.as_ref()),
            genesis.hash(),
            storage.clone(),
            reachability.clone(),
        ));
        let template_builder = BlockTemplateBuilder::new(
            params.block_bits,
            storage.clone(),
            ghostdag_manager.clone(),
            body_processor.clone(),
            virtual_processor.clone(),
            coinbase_manager,
        );
        let block_processor = BlockProcessor::new(
            genesis,
            storage.clone(),
            reachability,
            ghostdag_manager,
            block_validator,
            body_processor,
            virtual_processor.clone(),
            pruning_manager.clone(),
        );

        Self {
            config,
            storage,
            block_processor,
            virtual_processor,
            pruning_manager,
            template_builder,
            state: RwLock::new(ConsensusState { lifecycle: LifecycleState::NotStarted, events: None, virtual_state: None }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.read().lifecycle
    }

    /// Initialises genesis on an empty store or loads and verifies the stored
    /// state, then opens the event feed and returns its receiving end.
    pub fn start(&self) -> ConsensusResult<UnboundedReceiver<ConsensusEvent>> {
        let mut state = self.state.write();
        if !state.lifecycle.can_transition_to(LifecycleState::Running) {
            return Err(ConsensusError::InvalidLifecycleTransition { from: state.lifecycle, to: LifecycleState::Running });
        }
        self.config.params.validate()?;

        let virtual_state = match self.storage.metadata_store.get_virtual_state()? {
            None => self.block_processor.process_genesis()?,
            Some(stored) => self.load_virtual_state(stored)?,
        };
        let (sender, receiver) = unbounded_channel();

        info!(
            "consensus started on {:?}: sink {} at blue score {}",
            self.config.net,
            virtual_state.sink(),
            virtual_state.ghostdag_data.blue_score
        );
        state.transition(LifecycleState::Running)?;
        state.events = Some(sender);
        state.virtual_state = Some(virtual_state);
        Ok(receiver)
    }

    /// Stops accepting blocks. Queries keep working until [`Consensus::close`].
    pub fn begin_shutdown(&self) -> ConsensusResult<()> {
        self.state.write().transition(LifecycleState::ShuttingDown)?;
        info!("consensus shutting down");
        Ok(())
    }

    /// Closes the event feed
    pub fn close(&self) -> ConsensusResult<()> {
        let mut state = self.state.write();
        state.transition(LifecycleState::Stopped)?;
        state.events.take();
        info!("consensus stopped");
        Ok(())
    }

    fn load_virtual_state(&self, stored: VirtualState) -> ConsensusResult<VirtualState> {
        let sink = stored.sink();
        if !self.storage.ghostdag_store.has(&sink)? {
            return Err(ConsensusError::internal(format!("stored sink {sink} has no GHOSTDAG data")));
        }

        let verified = if stored.multiset()? != self.storage.multiset_store.get(&sink)? {
            warn!("virtual multiset disagrees with sink {}, rebuilding the virtual UTXO set", sink);
            self.virtual_processor.rebuild_virtual_utxo_set(&stored, self.pruning_manager.pruning_point()?)?
        } else {
            stored
        };

        // Catch up with blocks committed before a virtual update could follow
        let update = self.virtual_processor.update_virtual(&verified)?;
        if let Some(pruning_point) = self.pruning_manager.maybe_advance_pruning_point(update.sink)? {
            debug!("pruning point caught up to {}", pruning_point);
        }
        Ok(update.state)
    }

    fn read_state(&self) -> ConsensusResult<RwLockReadGuard<'_, ConsensusState>> {
        let state = self.state.read();
        if !state.lifecycle.accepts_reads() {
            return Err(ConsensusError::NotRunning(state.lifecycle));
        }
        Ok(state)
    }

    fn now_millis() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or_default()
    }
}

impl ConsensusApi for Consensus {
    fn add_block(&self, block: Block) -> ConsensusResult<BlockProcessingResult> {
        let hash = block.hash();
        if let Err(err) = self.block_processor.validate_block_in_isolation(&block) {
            warn!("rejected block {}: {}", hash, err);
            return Err(err.into());
        }

        let mut state = self.state.write();
        if !state.lifecycle.accepts_writes() {
            return Err(ConsensusError::NotRunning(state.lifecycle));
        }

        let outcome = match self.block_processor.process_block(&block, state.virtual_state()?) {
            Ok(outcome) => outcome,
            Err(err) if err.is_fatal() => {
                error!("fatal error while processing block {}: {}", hash, err);
                return Err(err);
            }
            Err(err) => {
                warn!("rejected block {}: {}", hash, err);
                return Err(err);
            }
        };

        state.virtual_state = Some(outcome.virtual_state);
        if let Some(sender) = &state.events {
            for event in outcome.events {
                if sender.send(event).is_err() {
                    debug!("event receiver is gone");
                    break;
                }
            }
        }
        Ok(outcome.result)
    }

    fn build_block_template(&self, payout_script: ScriptPublicKey, extra_data: Vec<u8>) -> ConsensusResult<(Block, State)> {
        let state = self.read_state()?;
        let virtual_state = state.virtual_state()?;
        let request = TemplateRequest { payout_script, extra_data, transactions: Vec::new(), timestamp: Self::now_millis() };
        let block = self.template_builder.build_block_with_parents(virtual_state, virtual_state.parents.clone(), request)?;
        let pow_state = State::new(&block.header);
        Ok((block, pow_state))
    }

    fn build_block_with_parents(
        &self,
        parents: Vec<Hash>,
        payout_script: ScriptPublicKey,
        extra_data: Vec<u8>,
        transactions: Vec<Transaction>,
    ) -> ConsensusResult<Block> {
        let state = self.read_state()?;
        let request = TemplateRequest { payout_script, extra_data, transactions, timestamp: Self::now_millis() };
        self.template_builder.build_block_with_parents(state.virtual_state()?, parents, request)
    }

    fn get_virtual_selected_parent_hash(&self) -> ConsensusResult<Hash> {
        Ok(self.read_state()?.virtual_state()?.sink())
    }

    fn get_utxo_by_outpoint(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>> {
        let _state = self.read_state()?;
        Ok(self.storage.virtual_utxo_store.get_utxo(outpoint)?)
    }

    fn get_coin_supply(&self) -> ConsensusResult<u64> {
        Ok(self.read_state()?.virtual_state()?.coin_supply)
    }

    fn get_block_ghostdag_data(&self, hash: &Hash) -> ConsensusResult<Option<GhostdagData>> {
        let _state = self.read_state()?;
        Ok(self.storage.ghostdag_store.get_data(hash)?)
    }

    fn get_block(&self, hash: &Hash) -> ConsensusResult<Option<Block>> {
        let _state = self.read_state()?;
        Ok(self.storage.block_store.get_block(hash)?)
    }

    fn get_block_count(&self) -> ConsensusResult<usize> {
        let _state = self.read_state()?;
        Ok(self.storage.block_store.count()?)
    }

    fn get_tips(&self) -> ConsensusResult<Vec<Hash>> {
        let _state = self.read_state()?;
        Ok(self.storage.metadata_store.get_tips()?)
    }

    fn get_virtual_parents(&self) -> ConsensusResult<Vec<Hash>> {
        Ok(self.read_state()?.virtual_state()?.parents.clone())
    }

    fn get_pruning_point(&self) -> ConsensusResult<Hash> {
        let _state = self.read_state()?;
        self.pruning_manager.pruning_point()
    }

    fn get_virtual_utxo_commitment(&self) -> ConsensusResult<Hash> {
        Ok(self.read_state()?.virtual_state()?.multiset()?.finalize())
    }
}
