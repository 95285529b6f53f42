use consensus_core::config::params::Params;
use consensus_core::config::Config as ConsensusConfig;
use consensus_core::network::NetworkType;
use consensus_core::tx::ScriptPublicKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub pruning: PruningConfig,
    pub mining: MiningConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Entries kept by each store cache
    pub cache_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningConfig {
    pub archival: bool,
    pub sanity_check_utxo_set: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    pub enabled: bool,
    /// Hex encoded payout script
    pub mining_address: Option<String>,
    pub max_blocks: Option<u64>,
}

impl Config {
    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load default configuration for network
    pub fn for_network(network: &str) -> Result<Self, String> {
        let net: NetworkType = network.parse()?;
        let mut config = Config::default();
        config.network.network_id = net.to_string();
        config.storage.data_dir = PathBuf::from("./data").join(net.to_string());
        Ok(config)
    }

    /// Override config with CLI arguments
    pub fn apply_cli_overrides(&mut self, args: &crate::cli::Args) {
        if let Some(network) = &args.network {
            self.network.network_id = network.clone();
        }

        if let Some(data_dir) = &args.data_dir {
            self.storage.data_dir = data_dir.clone();
        }

        if args.archival {
            self.pruning.archival = true;
        }

        if args.sanity_check_pruning_utxoset {
            self.pruning.sanity_check_utxo_set = true;
        }

        if args.enable_mining {
            self.mining.enabled = true;
        }

        if let Some(address) = &args.mining_address {
            self.mining.mining_address = Some(address.clone());
        }

        if let Some(blocks) = args.blocks {
            self.mining.max_blocks = Some(blocks);
        }
    }

    pub fn network_type(&self) -> Result<NetworkType, String> {
        self.network.network_id.parse()
    }

    /// Engine configuration for the selected network
    pub fn consensus_config(&self) -> Result<ConsensusConfig, String> {
        let params = Params::for_network(self.network_type()?);
        let mut config = ConsensusConfig::new(params)
            .with_archival(self.pruning.archival)
            .with_sanity_check(self.pruning.sanity_check_utxo_set);
        config.cache_size = self.storage.cache_size;
        Ok(config)
    }

    /// The script mined coinbases pay to
    pub fn payout_script(&self) -> Result<ScriptPublicKey, String> {
        let address = self.mining.mining_address.as_ref().ok_or("Mining enabled but no mining address provided")?;
        let script = hex::decode(address).map_err(|e| format!("Invalid mining address {}: {}", address, e))?;
        if script.is_empty() {
            return Err("Mining address is empty".to_string());
        }
        Ok(ScriptPublicKey::new(0, script))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig { network_id: NetworkType::Mainnet.to_string() },
            storage: StorageConfig { data_dir: PathBuf::from("./data"), cache_size: ConsensusConfig::DEFAULT_CACHE_SIZE },
            pruning: PruningConfig { archival: false, sanity_check_utxo_set: false },
            mining: MiningConfig { enabled: false, mining_address: None, max_blocks: None },
        }
    }
}
