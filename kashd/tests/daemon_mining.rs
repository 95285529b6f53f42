use consensus::{Consensus, ConsensusApi};
use database::Database;
use kashd::{Config, Daemon};
use std::sync::Arc;
use tempfile::TempDir;

fn mining_config(dir: &TempDir, blocks: Option<u64>) -> Config {
    let mut config = Config::for_network("simnet").unwrap();
    config.storage.data_dir = dir.path().join("data");
    config.mining.enabled = true;
    config.mining.mining_address = Some("51".to_string());
    config.mining.max_blocks = blocks;
    config
}

#[tokio::test]
async fn test_daemon_mines_and_persists() {
    let dir = TempDir::new().unwrap();
    let config = mining_config(&dir, Some(5));
    let data_dir = config.storage.data_dir.clone();

    let summary = Daemon::new(config.clone()).await.unwrap().run().await.unwrap();
    assert_eq!(summary.blocks_mined, 5);
    // A block added and a virtual change per mined block
    assert_eq!(summary.events_logged, 10);

    let db = Database::open(&data_dir).unwrap();
    let consensus = Consensus::new(config.consensus_config().unwrap(), Arc::new(db));
    let _events = consensus.start().unwrap();
    assert_eq!(consensus.get_block_count().unwrap(), 6);
    assert_eq!(consensus.get_coin_supply().unwrap(), 5 * consensus.config().base_subsidy);
}

#[tokio::test]
async fn test_shutdown_broadcast_stops_daemon() {
    let dir = TempDir::new().unwrap();
    let mut config = mining_config(&dir, None);
    config.mining.enabled = false;

    let daemon = Daemon::new(config).await.unwrap();
    let shutdown = daemon.shutdown_handle();
    let run = tokio::spawn(daemon.run());
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    shutdown.send(()).unwrap();

    let summary = run.await.unwrap().unwrap();
    assert_eq!(summary.blocks_mined, 0);
    assert_eq!(summary.events_logged, 0);
}

#[tokio::test]
async fn test_mining_requires_hex_address() {
    let dir = TempDir::new().unwrap();
    let mut config = mining_config(&dir, Some(1));
    config.mining.mining_address = None;
    assert!(Daemon::new(config).await.is_err());
}
