use crate::tx::TransactionOutpoint;
use thiserror::Error;

/// Violations of the UTXO diff algebra. Any of these means derived state is corrupt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtxoAlgebraError {
    #[error("outpoint {0} is added twice")]
    DuplicateAdd(TransactionOutpoint),

    #[error("outpoint {0} is removed twice")]
    DuplicateRemove(TransactionOutpoint),

    #[error("cannot remove outpoint {0}: not in the set")]
    MissingForRemoval(TransactionOutpoint),

    #[error("cannot remove outpoint {0}: stored entry differs")]
    EntryMismatch(TransactionOutpoint),

    #[error("cannot add outpoint {0}: already in the set")]
    AlreadyPresent(TransactionOutpoint),
}

pub type UtxoAlgebraResult<T> = std::result::Result<T, UtxoAlgebraError>;
