use consensus_core::errors::ConsensusError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),

    #[error("Database is closed")]
    DatabaseClosed,
}

pub type DbResult<T> = Result<T, DbError>;

impl From<bincode::Error> for DbError {
    fn from(err: bincode::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

impl From<DbError> for ConsensusError {
    fn from(err: DbError) -> Self {
        ConsensusError::Store(err.to_string())
    }
}

/// Turns a missing value into [`DbError::NotFound`]
pub trait StoreResultExtensions<T> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> DbResult<T>;
}

impl<T> StoreResultExtensions<T> for DbResult<Option<T>> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> DbResult<T> {
        self?.ok_or_else(|| DbError::NotFound(what()))
    }
}
