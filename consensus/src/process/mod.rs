//! Supporting processes for consensus
//!
//! This module provides coinbase handling, block template building and
//! pruning point management.

pub mod coinbase;
pub mod mining;
pub mod pruning;

pub use coinbase::CoinbaseManager;
pub use mining::{BlockTemplateBuilder, TemplateRequest};
pub use pruning::{PruningConfig, PruningManager};
