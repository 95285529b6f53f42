use crate::{ghostdag::GhostdagData, tx::TransactionId, Hash};
use serde::{Deserialize, Serialize};

/// Lifecycle of a consensus instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    NotStarted,
    Running,
    ShuttingDown,
    Stopped,
}

impl LifecycleState {
    /// Transitions only move forward, one step at a time
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!((self, next), (NotStarted, Running) | (Running, ShuttingDown) | (ShuttingDown, Stopped))
    }

    pub fn accepts_writes(self) -> bool {
        self == LifecycleState::Running
    }

    pub fn accepts_reads(self) -> bool {
        matches!(self, LifecycleState::Running | LifecycleState::ShuttingDown)
    }
}

/// Changes of the virtual selected chain caused by a single block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualChainChanges {
    /// Chain blocks removed, newest first
    pub removed: Vec<Hash>,
    /// Chain blocks added, oldest first
    pub added: Vec<Hash>,
}

impl VirtualChainChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Outcome of a successful `add_block`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProcessingResult {
    pub hash: Hash,
    pub ghostdag_data: GhostdagData,
    /// Transactions accepted by this block, in acceptance order
    pub accepted_transaction_ids: Vec<TransactionId>,
    pub sink: Hash,
    pub chain_changes: VirtualChainChanges,
    /// Set when this block moved the pruning point
    pub new_pruning_point: Option<Hash>,
}

/// Notifications emitted in commit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusEvent {
    BlockAdded { hash: Hash },
    VirtualChanged { sink: Hash, removed: Vec<Hash>, added: Vec<Hash> },
    PruningPointUtxoSetOverride { pruning_point: Hash },
}

#[cfg(test)]
mod tests {
    use super::LifecycleState::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        assert!(NotStarted.can_transition_to(Running));
        assert!(Running.can_transition_to(ShuttingDown));
        assert!(ShuttingDown.can_transition_to(Stopped));
        assert!(!NotStarted.can_transition_to(Stopped));
        assert!(!Stopped.can_transition_to(Running));
        assert!(!Running.can_transition_to(Running));
        assert!(ShuttingDown.accepts_reads() && !ShuttingDown.accepts_writes());
    }
}
