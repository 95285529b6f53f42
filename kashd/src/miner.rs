//! In-process CPU miner
//!
//! Builds templates on the virtual parents, searches nonces against the
//! template's PoW state and submits solved blocks back to consensus.

use crate::ui;
use consensus::{Consensus, ConsensusApi};
use consensus_core::api::BlockProcessingResult;
use consensus_core::errors::ConsensusError;
use consensus_core::tx::ScriptPublicKey;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Nonces tried between two checks of the stop flag
const NONCE_BATCH: u64 = 1 << 16;

/// Blocks between two hash rate reports
const REPORT_INTERVAL: u64 = 10;

pub struct Miner {
    consensus: Arc<Consensus>,
    payout_script: ScriptPublicKey,
    max_blocks: Option<u64>,
    session: u64,
}

/// A block found and accepted by consensus
pub struct MinedBlock {
    pub result: BlockProcessingResult,
    pub hashes: u64,
}

impl Miner {
    pub fn new(consensus: Arc<Consensus>, payout_script: ScriptPublicKey, max_blocks: Option<u64>) -> Self {
        let session = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or_default();
        Self { consensus, payout_script, max_blocks, session }
    }

    /// Mines one block on the current virtual. Returns `None` when `stop` was
    /// raised before a nonce was found.
    pub fn mine_block(&self, sequence: u64, stop: &AtomicBool) -> Result<Option<MinedBlock>, ConsensusError> {
        // Distinct extra data per block keeps coinbase ids unique across sessions
        let extra_data = format!("kashd/{}/{}", self.session, sequence).into_bytes();
        let (mut block, pow_state) = self.consensus.build_block_template(self.payout_script.clone(), extra_data)?;

        let mut hashes = 0u64;
        let mut start = 0u64;
        let nonce = loop {
            if stop.load(Ordering::Relaxed) {
                return Ok(None);
            }
            let end = start.saturating_add(NONCE_BATCH);
            if let Some(nonce) = pow_state.find_nonce(start..end) {
                hashes += nonce - start + 1;
                break nonce;
            }
            hashes += end - start;
            if end == u64::MAX {
                return Err(ConsensusError::internal("nonce space exhausted"));
            }
            start = end;
        };

        block.header.nonce = nonce;
        block.header.finalize();
        debug!("found nonce {} for block {} after {} hashes", nonce, block.hash(), hashes);
        let result = self.consensus.add_block(block)?;
        Ok(Some(MinedBlock { result, hashes }))
    }

    /// Mines until `stop` is raised, the block limit is reached or consensus
    /// stops accepting blocks. Returns the number of blocks mined.
    pub fn mine_until(&self, stop: &AtomicBool) -> Result<u64, String> {
        let started = Instant::now();
        let mut mined = 0u64;
        let mut total_hashes = 0u64;

        while self.max_blocks.map_or(true, |max| mined < max) {
            match self.mine_block(mined, stop) {
                Ok(Some(block)) => {
                    mined += 1;
                    total_hashes += block.hashes;
                    info!(
                        "mined block {} at blue score {}",
                        block.result.hash, block.result.ghostdag_data.blue_score
                    );
                    if mined % REPORT_INTERVAL == 0 {
                        let rate = total_hashes as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON);
                        info!("mined {} blocks, hash rate {}", mined, ui::format_hashrate(rate));
                    }
                }
                Ok(None) => break,
                Err(ConsensusError::NotRunning(state)) => {
                    debug!("consensus is {:?}, miner stopping", state);
                    break;
                }
                Err(err) if err.is_fatal() => return Err(format!("Mining failed: {}", err)),
                // The virtual moved while the block was being solved
                Err(err) => warn!("mined block rejected: {}", err),
            }
        }
        Ok(mined)
    }

    /// Runs the mine loop on a blocking thread until it finishes or a
    /// shutdown is broadcast
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<u64, String> {
        let stop = Arc::new(AtomicBool::new(false));
        let mut worker = {
            let stop = stop.clone();
            tokio::task::spawn_blocking(move || self.mine_until(&stop))
        };

        let joined = tokio::select! {
            joined = &mut worker => joined,
            _ = shutdown.recv() => {
                stop.store(true, Ordering::Relaxed);
                worker.await
            }
        };
        joined.map_err(|e| format!("Miner task failed: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::config::params::Params;
    use consensus_core::config::Config;
    use database::MemoryDb;

    fn miner(max_blocks: Option<u64>) -> (Miner, Arc<Consensus>) {
        let consensus = Arc::new(Consensus::new(Config::new(Params::simnet()), Arc::new(MemoryDb::new())));
        consensus.start().unwrap();
        (Miner::new(consensus.clone(), ScriptPublicKey::new(0, vec![0x51]), max_blocks), consensus)
    }

    #[test]
    fn mines_up_to_the_block_limit() {
        let (miner, consensus) = miner(Some(5));
        assert_eq!(miner.mine_until(&AtomicBool::new(false)).unwrap(), 5);
        assert_eq!(consensus.get_block_count().unwrap(), 6);
        assert_eq!(consensus.get_coin_supply().unwrap(), 5 * consensus.config().base_subsidy);
    }

    #[test]
    fn raised_stop_flag_mines_nothing() {
        let (miner, consensus) = miner(None);
        assert_eq!(miner.mine_until(&AtomicBool::new(true)).unwrap(), 0);
        assert_eq!(consensus.get_block_count().unwrap(), 1);
    }

    #[test]
    fn stops_when_consensus_shuts_down() {
        let (miner, consensus) = miner(None);
        consensus.begin_shutdown().unwrap();
        assert_eq!(miner.mine_until(&AtomicBool::new(false)).unwrap(), 0);
    }
}
