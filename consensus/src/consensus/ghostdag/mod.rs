//! GHOSTDAG consensus implementation
//!
//! This module implements the GHOSTDAG protocol for BlockDAG consensus,
//! including selected parent choice, mergeset discovery, blue/red colouring
//! and score calculation.

pub mod manager;
pub mod mergeset;
pub mod protocol;

pub use manager::GhostdagManager;
pub use protocol::GhostdagProtocol;
