//! Block processing pipeline for consensus
//!
//! This module provides the block processing pipeline that orchestrates
//! validation, GHOSTDAG calculation, UTXO processing and state updates.

pub mod block_processor;
pub mod body_processor;
pub mod virtual_processor;

pub use block_processor::BlockProcessor;
pub use body_processor::BodyProcessor;
pub use virtual_processor::VirtualProcessor;
