use crate::{
    api::LifecycleState,
    tx::{TransactionId, TransactionOutpoint},
    utxo::utxo_error::UtxoAlgebraError,
    Hash,
};
use kash_multiset::MultisetError;
use thiserror::Error;

/// Reasons a block is rejected. Rejections are never fatal for the node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("block {0} does not satisfy its proof-of-work target")]
    BadProofOfWork(Hash),

    #[error("header hash field {0} does not match the header content")]
    BadHeaderHash(Hash),

    #[error("expected merkle root {0} but got {1}")]
    BadMerkleRoot(Hash, Hash),

    #[error("block has no parents")]
    NoParents,

    #[error("block has {0} parents which exceeds the limit of {1}")]
    TooManyParents(usize, usize),

    #[error("parent {0} is listed more than once")]
    DuplicateParent(Hash),

    #[error("parent {0} is unknown or was pruned")]
    MissingParent(Hash),

    #[error("block has no transactions")]
    NoTransactions,

    #[error("first transaction is not a coinbase")]
    FirstTxNotCoinbase,

    #[error("block has more than one coinbase transaction")]
    MultipleCoinbases,

    #[error("coinbase transaction has inputs")]
    CoinbaseHasInputs,

    #[error("transaction {0} spends outpoint {1} more than once")]
    DuplicateTxInput(TransactionId, TransactionOutpoint),

    #[error("transaction {0} has a zero value output at index {1}")]
    ZeroValueOutput(TransactionId, usize),

    #[error("unexpected difficulty bits: expected {expected:#010x}, got {found:#010x}")]
    UnexpectedDifficulty { expected: u32, found: u32 },

    #[error("block {0} is already known")]
    DuplicateBlock(Hash),

    #[error("block version {0} is invalid")]
    InvalidBlockVersion(u16),

    #[error("coinbase payload is invalid: {0}")]
    InvalidPayload(String),

    #[error("outpoint {0} is missing or already spent")]
    DoubleSpend(TransactionOutpoint),

    #[error("coinbase output {outpoint} created at DAA score {created_at} is immature at DAA score {daa_score}")]
    ImmatureCoinbaseSpend { outpoint: TransactionOutpoint, created_at: u64, daa_score: u64 },

    #[error("transaction {tx} spends {outputs} but its inputs only hold {inputs}")]
    InsufficientInputs { tx: TransactionId, inputs: u64, outputs: u64 },

    #[error("output {0} already exists in the UTXO set")]
    OutputAlreadyExists(TransactionOutpoint),

    #[error("coinbase pays {found} but the allowed amount is {expected}")]
    InvalidCoinbaseAmount { expected: u64, found: u64 },

    #[error("expected UTXO commitment {expected} but the header commits to {found}")]
    UtxoCommitmentMismatch { expected: Hash, found: Hash },

    #[error("mergeset size {size} exceeds the limit of {limit}")]
    AnticoneSizeExceeded { size: usize, limit: u64 },

    #[error("the selected chain of block {0} does not contain the pruning point")]
    PruningPointNotInChain(Hash),
}

impl RuleError {
    pub fn kind(&self) -> ErrorKind {
        use RuleError::*;
        match self {
            DoubleSpend(_)
            | ImmatureCoinbaseSpend { .. }
            | InsufficientInputs { .. }
            | OutputAlreadyExists(_)
            | InvalidCoinbaseAmount { .. }
            | UtxoCommitmentMismatch { .. }
            | AnticoneSizeExceeded { .. }
            | PruningPointNotInChain(_) => ErrorKind::RuleViolation,
            _ => ErrorKind::Structural,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed block, detectable without the DAG state
    Structural,
    /// Block conflicts with the consensus state
    RuleViolation,
    /// Persistence failure
    Store,
    /// Derived data contradicts itself
    InternalInvariant,
    /// Call made in the wrong lifecycle state
    Lifecycle,
    /// Parameters the engine cannot run with
    Configuration,
}

impl ErrorKind {
    /// Fatal kinds leave the engine in a state that should not keep serving writes
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::Store | ErrorKind::InternalInvariant | ErrorKind::Configuration)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ConsensusError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("store error: {0}")]
    Store(String),

    #[error("internal invariant violation: {0}")]
    Internal(String),

    #[error("consensus is not running (state: {0:?})")]
    NotRunning(LifecycleState),

    #[error("invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidLifecycleTransition { from: LifecycleState, to: LifecycleState },

    #[error("invalid consensus parameters: {0}")]
    InvalidParams(String),
}

impl ConsensusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsensusError::Rule(err) => err.kind(),
            ConsensusError::Store(_) => ErrorKind::Store,
            ConsensusError::Internal(_) => ErrorKind::InternalInvariant,
            ConsensusError::NotRunning(_) | ConsensusError::InvalidLifecycleTransition { .. } => ErrorKind::Lifecycle,
            ConsensusError::InvalidParams(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ConsensusError::Internal(msg.into())
    }
}

impl From<UtxoAlgebraError> for ConsensusError {
    fn from(err: UtxoAlgebraError) -> Self {
        ConsensusError::Internal(err.to_string())
    }
}

impl From<MultisetError> for ConsensusError {
    fn from(err: MultisetError) -> Self {
        ConsensusError::Internal(err.to_string())
    }
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;
pub type ConsensusResult<T> = std::result::Result<T, ConsensusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_fatality() {
        let structural: ConsensusError = RuleError::NoParents.into();
        assert_eq!(structural.kind(), ErrorKind::Structural);
        assert!(!structural.is_fatal());

        let violation: ConsensusError = RuleError::DoubleSpend(TransactionOutpoint::default()).into();
        assert_eq!(violation.kind(), ErrorKind::RuleViolation);

        assert!(ConsensusError::Store("io".into()).is_fatal());
        assert!(ConsensusError::internal("bad").is_fatal());

        let lifecycle = ConsensusError::NotRunning(LifecycleState::Stopped);
        assert_eq!(lifecycle.kind(), ErrorKind::Lifecycle);
        assert!(!lifecycle.is_fatal());
    }

    #[test]
    fn algebra_errors_are_internal() {
        let err: ConsensusError = UtxoAlgebraError::DuplicateAdd(TransactionOutpoint::default()).into();
        assert_eq!(err.kind(), ErrorKind::InternalInvariant);
    }
}
