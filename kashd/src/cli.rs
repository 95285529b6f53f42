use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "kashd")]
#[command(about = "Kash blockDAG node daemon", long_about = None)]
pub struct Args {
    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// Data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Network (mainnet, testnet, devnet, simnet)
    #[arg(short, long)]
    pub network: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Keep the full block history when the pruning point advances
    #[arg(long)]
    pub archival: bool,

    /// Verify the pruning point UTXO set against its commitment on every advance
    #[arg(long = "sanity-check-pruning-utxoset")]
    pub sanity_check_pruning_utxoset: bool,

    /// Enable the in-process miner
    #[arg(long)]
    pub enable_mining: bool,

    /// Hex encoded payout script (required if mining enabled)
    #[arg(long)]
    pub mining_address: Option<String>,

    /// Stop the node after mining this many blocks
    #[arg(long)]
    pub blocks: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_flags() {
        let args = Args::parse_from([
            "kashd",
            "--network",
            "simnet",
            "--archival",
            "--sanity-check-pruning-utxoset",
            "--enable-mining",
            "--mining-address",
            "51",
            "--blocks",
            "20",
        ]);
        assert_eq!(args.network.as_deref(), Some("simnet"));
        assert!(args.archival && args.sanity_check_pruning_utxoset && args.enable_mining);
        assert_eq!(args.mining_address.as_deref(), Some("51"));
        assert_eq!(args.blocks, Some(20));
        assert_eq!(args.log_level, "info");
    }
}
