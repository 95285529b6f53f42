//! kashd - Kash blockDAG node daemon
//!
//! Hosts the consensus engine over a RocksDB store: configuration loading,
//! logging, an optional in-process CPU miner, an event feed logger and
//! graceful shutdown.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod miner;
pub mod ui;

pub use cli::Args;
pub use config::Config;
pub use daemon::{Daemon, RunSummary};
pub use miner::Miner;
