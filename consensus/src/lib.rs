//! Consensus library for BlockDAG-based blockchain
//!
//! This library implements the consensus engine using the GHOSTDAG algorithm:
//! block ordering, UTXO validation with multiset commitments, virtual
//! resolution and pruning, behind the [`Consensus`] façade.

pub mod api;
pub mod consensus;
pub mod pipeline;
pub mod process;

// Re-export key types for easier access
pub use api::ConsensusApi;
pub use consensus::dag::ReachabilityService;
pub use consensus::ghostdag::{GhostdagManager, GhostdagProtocol};
pub use consensus::storage::ConsensusStorage;
pub use consensus::types::{BlockProcessingOutcome, ChainPath, VirtualUpdate};
pub use consensus::validation::{BlockValidator, HeaderValidator, TransactionValidator};
pub use consensus::Consensus;
pub use consensus_core::Hash;

// Re-export pipeline types
pub use pipeline::{BlockProcessor, BodyProcessor, VirtualProcessor};
pub use process::{BlockTemplateBuilder, CoinbaseManager, PruningManager};
