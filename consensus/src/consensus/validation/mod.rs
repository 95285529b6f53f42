//! Validation module for consensus
//!
//! This module provides context-free validation of blocks, headers and
//! transactions, and transaction validation against a UTXO view.

pub mod block_validator;
pub mod header_validator;
pub mod transaction_validator;

pub use block_validator::BlockValidator;
pub use header_validator::HeaderValidator;
pub use transaction_validator::TransactionValidator;
