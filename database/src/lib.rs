//! Durable key/value persistence for the consensus engine: a RocksDB backend,
//! an in-memory backend and typed stores per namespace.

pub mod cache;
pub mod db;
pub mod errors;
pub mod kv;
pub mod memory;
pub mod stores;

pub use db::Database;
pub use errors::{DbError, DbResult};
pub use kv::{KeyValueStore, StoreBatch};
pub use memory::MemoryDb;
