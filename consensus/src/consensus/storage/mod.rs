//! Storage module for consensus
//!
//! Typed stores live in the `database` crate; this module groups them for the engine.

pub mod consensus_db;

pub use consensus_db::ConsensusStorage;
