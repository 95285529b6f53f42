use serde::{Deserialize, Serialize};

use super::genesis::GenesisBlock;
use crate::{
    errors::{ConsensusError, ConsensusResult},
    constants::{DEFAULT_BASE_SUBSIDY, DEFAULT_COINBASE_MATURITY, DEFAULT_GHOSTDAG_K, DEFAULT_MAX_BLOCK_PARENTS, MAX_TARGET_BITS},
    network::NetworkType,
    KType,
};

/// Consensus parameters of a network. Algorithms read every tunable from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub net: NetworkType,
    pub genesis: GenesisBlock,

    /// GHOSTDAG k: maximum blue anticone size
    pub ghostdag_k: KType,
    pub max_block_parents: usize,
    pub mergeset_size_limit: u64,

    /// Blue score distance between the sink and the pruning point
    pub finality_depth: u64,

    /// DAA score distance before a coinbase output can be spent
    pub coinbase_maturity: u64,
    pub base_subsidy: u64,
    /// DAA score interval after which the subsidy halves
    pub subsidy_halving_interval: u64,

    /// Fixed difficulty bits every block must carry
    pub block_bits: u32,
    pub skip_proof_of_work: bool,
    /// Expected block interval in milliseconds, used by block templates
    pub target_time_per_block: u64,
}

impl Params {
    pub fn mainnet() -> Self {
        Self {
            net: NetworkType::Mainnet,
            genesis: GenesisBlock::new(1_760_745_600_000, 0x1e7f_ffff, 0, b"kash mainnet genesis"),
            ghostdag_k: DEFAULT_GHOSTDAG_K,
            max_block_parents: DEFAULT_MAX_BLOCK_PARENTS,
            mergeset_size_limit: DEFAULT_GHOSTDAG_K as u64 * 10,
            finality_depth: 86_400,
            coinbase_maturity: DEFAULT_COINBASE_MATURITY,
            base_subsidy: DEFAULT_BASE_SUBSIDY,
            subsidy_halving_interval: 31_536_000,
            block_bits: 0x1e7f_ffff,
            skip_proof_of_work: false,
            target_time_per_block: 1000,
        }
    }

    pub fn testnet() -> Self {
        Self {
            net: NetworkType::Testnet,
            genesis: GenesisBlock::new(1_760_745_600_000, 0x1f00_ffff, 0, b"kash testnet genesis"),
            finality_depth: 8_640,
            block_bits: 0x1f00_ffff,
            ..Self::mainnet()
        }
    }

    pub fn devnet() -> Self {
        Self {
            net: NetworkType::Devnet,
            genesis: GenesisBlock::new(1_760_745_600_000, MAX_TARGET_BITS, 0, b"kash devnet genesis"),
            finality_depth: 1_000,
            coinbase_maturity: 10,
            subsidy_halving_interval: 1_000_000,
            block_bits: MAX_TARGET_BITS,
            ..Self::mainnet()
        }
    }

    /// Parameters for local simulations and tests: easiest target, proof of work not verified
    pub fn simnet() -> Self {
        Self {
            net: NetworkType::Simnet,
            genesis: GenesisBlock::new(1_760_745_600_000, MAX_TARGET_BITS, 0, b"kash simnet genesis"),
            finality_depth: 100,
            coinbase_maturity: 10,
            subsidy_halving_interval: 1_000_000,
            block_bits: MAX_TARGET_BITS,
            skip_proof_of_work: true,
            target_time_per_block: 100,
            ..Self::mainnet()
        }
    }

    /// Rejects parameter sets the engine cannot run with. The finality depth
    /// must exceed k so that every block in the anticone of the pruning point
    /// is red.
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.finality_depth <= self.ghostdag_k as u64 {
            return Err(ConsensusError::InvalidParams(format!(
                "finality depth {} must exceed ghostdag k {}",
                self.finality_depth, self.ghostdag_k
            )));
        }
        if self.mergeset_size_limit < self.ghostdag_k as u64 {
            return Err(ConsensusError::InvalidParams(format!(
                "mergeset size limit {} is below ghostdag k {}",
                self.mergeset_size_limit, self.ghostdag_k
            )));
        }
        if self.max_block_parents == 0 {
            return Err(ConsensusError::InvalidParams("max block parents must be positive".to_string()));
        }
        Ok(())
    }

    pub fn for_network(net: NetworkType) -> Self {
        match net {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
            NetworkType::Devnet => Self::devnet(),
            NetworkType::Simnet => Self::simnet(),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn networks_have_distinct_genesis() {
        let hashes: std::collections::HashSet<_> = NetworkType::iter().map(|n| Params::for_network(n).genesis.hash()).collect();
        assert_eq!(hashes.len(), 4);
    }

    #[test]
    fn serde_roundtrip() {
        let params = Params::devnet();
        let bytes = bincode::serialize(&params).unwrap();
        let decoded: Params = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, params);
        assert!(params.mergeset_size_limit >= params.ghostdag_k as u64);
    }

    #[test]
    fn presets_are_valid() {
        for net in NetworkType::iter() {
            Params::for_network(net).validate().unwrap();
        }
    }

    #[test]
    fn finality_depth_must_exceed_k() {
        let params = Params { finality_depth: 18, ghostdag_k: 18, ..Params::simnet() };
        assert!(matches!(params.validate(), Err(ConsensusError::InvalidParams(_))));
        let params = Params { ghostdag_k: 4, finality_depth: 10, ..Params::simnet() };
        assert!(params.validate().is_ok());
    }
}
