use crate::config::Config;
use crate::miner::Miner;
use crate::ui;
use consensus::{Consensus, ConsensusApi};
use consensus_core::api::ConsensusEvent;
use database::Database;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::sync::broadcast;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

const STATUS_INTERVAL: Duration = Duration::from_secs(30);

pub struct Daemon {
    config: Config,
    shutdown_tx: broadcast::Sender<()>,
    db: Database,
    consensus: Arc<Consensus>,
    miner: Option<Miner>,
}

/// What a daemon run did, reported once it stopped
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub blocks_mined: u64,
    pub events_logged: u64,
    pub uptime: Duration,
}

impl Daemon {
    /// Create new daemon instance
    pub async fn new(config: Config) -> Result<Self, String> {
        ui::print_section("Initializing Components");
        let (shutdown_tx, _) = broadcast::channel(1);
        let consensus_config = config.consensus_config()?;

        info!("Initializing storage at {:?}", config.storage.data_dir);
        std::fs::create_dir_all(&config.storage.data_dir).map_err(|e| format!("Failed to create data directory: {}", e))?;
        let db = Database::open(&config.storage.data_dir).map_err(|e| format!("Failed to open DB: {}", e))?;

        info!("Initializing consensus engine for {}", consensus_config.net);
        let consensus = Arc::new(Consensus::new(consensus_config, Arc::new(db.clone())));

        let miner = if config.mining.enabled {
            info!("Initializing miner");
            Some(Miner::new(consensus.clone(), config.payout_script()?, config.mining.max_blocks))
        } else {
            None
        };

        ui::print_status("✓", "All components initialized successfully", ui::StatusType::Success);
        Ok(Self { config, shutdown_tx, db, consensus, miner })
    }

    /// Sender whose broadcast stops a running daemon
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run the daemon until Ctrl+C, a shutdown broadcast or the end of mining
    pub async fn run(self) -> Result<RunSummary, String> {
        ui::print_section("Starting Services");
        info!("Starting kashd on {}", self.config.network.network_id);
        let start_time = Instant::now();

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let events = self.consensus.start().map_err(|e| format!("Failed to start consensus: {}", e))?;
        let event_logger = tokio::spawn(log_events(events));
        let status_handle = tokio::spawn(report_status(self.consensus.clone(), start_time));

        let mut miner_handle = match self.miner {
            Some(miner) => Some(tokio::spawn(miner.run(self.shutdown_tx.subscribe()))),
            None => {
                ui::print_status("ℹ", "Mining not enabled", ui::StatusType::Info);
                None
            }
        };

        ui::print_status("✓", "kashd is now running", ui::StatusType::Success);
        ui::print_status("ℹ", "Press Ctrl+C to stop the daemon", ui::StatusType::Info);

        let mined = tokio::select! {
            _ = signal::ctrl_c() => {
                ui::print_status("ℹ", "Received Ctrl+C, shutting down gracefully...", ui::StatusType::Warning);
                info!("Received Ctrl+C, shutting down");
                None
            }
            _ = shutdown_rx.recv() => {
                info!("Received shutdown signal");
                None
            }
            mined = join_miner(&mut miner_handle) => {
                info!("Miner finished, shutting down");
                Some(mined)
            }
        };

        // Broadcast shutdown to all components
        let _ = self.shutdown_tx.send(());
        status_handle.abort();
        let _ = status_handle.await;

        self.consensus.begin_shutdown().map_err(|e| e.to_string())?;
        let mined = match (mined, miner_handle.is_some()) {
            (Some(mined), _) => mined,
            (None, true) => join_miner(&mut miner_handle).await,
            (None, false) => Ok(0),
        };
        self.consensus.close().map_err(|e| e.to_string())?;

        let events_logged = event_logger.await.map_err(|e| format!("Event logger failed: {}", e))?;
        self.db.close();

        let summary = RunSummary { blocks_mined: mined?, events_logged, uptime: start_time.elapsed() };
        info!(
            "kashd stopped after {}: {} blocks mined, {} events",
            ui::format_duration(summary.uptime),
            summary.blocks_mined,
            summary.events_logged
        );
        Ok(summary)
    }
}

/// Waits for the miner if one runs, otherwise never completes
async fn join_miner(handle: &mut Option<JoinHandle<Result<u64, String>>>) -> Result<u64, String> {
    match handle {
        Some(task) => {
            let mined = task.await.map_err(|e| format!("Miner task failed: {}", e))?;
            handle.take();
            mined
        }
        None => std::future::pending().await,
    }
}

/// Logs the consensus event feed until it closes. Returns the number of events seen.
async fn log_events(mut events: UnboundedReceiver<ConsensusEvent>) -> u64 {
    let mut count = 0;
    while let Some(event) = events.recv().await {
        count += 1;
        match event {
            ConsensusEvent::BlockAdded { hash } => debug!("block added: {}", hash),
            ConsensusEvent::VirtualChanged { sink, removed, added } => {
                info!("virtual changed: sink {} ({} removed, {} added)", sink, removed.len(), added.len())
            }
            ConsensusEvent::PruningPointUtxoSetOverride { pruning_point } => {
                info!("pruning point UTXO set moved to {}", pruning_point)
            }
        }
    }
    debug!("event feed closed after {} events", count);
    count
}

async fn report_status(consensus: Arc<Consensus>, start_time: Instant) {
    let mut ticker = interval(STATUS_INTERVAL);
    loop {
        ticker.tick().await;
        let status = consensus.get_block_count().and_then(|blocks| {
            Ok((blocks, consensus.get_virtual_selected_parent_hash()?, consensus.get_coin_supply()?))
        });
        match status {
            Ok((blocks, sink, supply)) => info!(
                "uptime {}, {} blocks, sink {}, coin supply {}",
                ui::format_duration(start_time.elapsed()),
                blocks,
                sink,
                supply
            ),
            Err(err) => debug!("status unavailable: {}", err),
        }
    }
}
