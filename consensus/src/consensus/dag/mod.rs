//! DAG traversal for BlockDAG consensus
//!
//! This module provides ancestry queries over the parent links and the
//! selected-parent chains held by the stores.

pub mod reachability;

pub use reachability::ReachabilityService;
