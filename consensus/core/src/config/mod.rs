pub mod genesis;
pub mod params;

use serde::{Deserialize, Serialize};

use self::params::Params;

/// Engine configuration: network parameters plus node-local switches
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub params: Params,

    /// Keep the full history when the pruning point advances
    pub is_archival: bool,

    /// Verify the pruning point UTXO set against its stored multiset on every advance
    pub enable_sanity_check_pruning_utxo_set: bool,

    /// Number of entries kept by each store cache
    pub cache_size: usize,
}

impl Config {
    pub const DEFAULT_CACHE_SIZE: usize = 10_000;

    pub fn new(params: Params) -> Self {
        Self { params, is_archival: false, enable_sanity_check_pruning_utxo_set: false, cache_size: Self::DEFAULT_CACHE_SIZE }
    }

    pub fn with_archival(mut self, is_archival: bool) -> Self {
        self.is_archival = is_archival;
        self
    }

    pub fn with_sanity_check(mut self, enabled: bool) -> Self {
        self.enable_sanity_check_pruning_utxo_set = enabled;
        self
    }
}

impl std::ops::Deref for Config {
    type Target = Params;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}
