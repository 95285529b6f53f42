/// Current block version
pub const BLOCK_VERSION: u16 = 1;

/// Current transaction version
pub const TX_VERSION: u16 = 0;

/// Number of sompi (base units) in one Kash
pub const SOMPI_PER_KASH: u64 = 100_000_000;

/// Maximum number of sompi that may ever exist
pub const MAX_SOMPI: u64 = 29_000_000_000 * SOMPI_PER_KASH;

/// Default GHOSTDAG k
pub const DEFAULT_GHOSTDAG_K: crate::KType = 18;

/// Default maximum number of direct parents of a block
pub const DEFAULT_MAX_BLOCK_PARENTS: usize = 10;

/// Coinbase maturity expressed in DAA score units
pub const DEFAULT_COINBASE_MATURITY: u64 = 100;

/// Default per-block subsidy before halvings
pub const DEFAULT_BASE_SUBSIDY: u64 = 500 * SOMPI_PER_KASH;

/// Lowest possible difficulty in compact form (maximum target)
pub const MAX_TARGET_BITS: u32 = 0x207f_ffff;

/// Size of the blue score prefix of every coinbase payload
pub const COINBASE_PAYLOAD_BLUE_SCORE_LEN: usize = 8;
