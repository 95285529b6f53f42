//! Core consensus types shared by the consensus engine, the storage layer and
//! the node binary: blocks, transactions, UTXO algebra, GHOSTDAG data,
//! network parameters and the error taxonomy.

use std::collections::{HashMap, HashSet};

pub mod api;
pub mod block;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ghostdag;
pub mod hashing;
pub mod header;
pub mod merkle;
pub mod multiset;
pub mod network;
pub mod subnets;
pub mod tx;
pub mod utxo;

pub use kash_hashes::Hash;
pub use kash_math::Uint192;

/// Accumulated proof of work of blue blocks
pub type BlueWorkType = Uint192;

/// The GHOSTDAG k parameter type
pub type KType = u16;

pub type BlockHashMap<V> = HashMap<Hash, V>;
pub type BlockHashSet = HashSet<Hash>;

pub const ZERO_HASH: Hash = Hash::zeroed();
