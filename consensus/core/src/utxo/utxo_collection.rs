use std::collections::hash_map::{self, HashMap};

use serde::{Deserialize, Serialize};

use crate::tx::{TransactionOutpoint, UtxoEntry};
use crate::utxo::utxo_error::{UtxoAlgebraError, UtxoAlgebraResult};
use crate::utxo::UtxoDiff;

/// An in-memory map from outpoint to UTXO entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoCollection {
    utxos: HashMap<TransactionOutpoint, UtxoEntry>,
}

impl UtxoCollection {
    pub fn new() -> Self {
        Self { utxos: HashMap::new() }
    }

    pub fn contains(&self, outpoint: &TransactionOutpoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn get(&self, outpoint: &TransactionOutpoint) -> Option<&UtxoEntry> {
        self.utxos.get(outpoint)
    }

    /// Returns true if `outpoint` maps to exactly `entry`
    pub fn contains_entry(&self, outpoint: &TransactionOutpoint, entry: &UtxoEntry) -> bool {
        self.utxos.get(outpoint).is_some_and(|e| e == entry)
    }

    pub fn insert(&mut self, outpoint: TransactionOutpoint, entry: UtxoEntry) -> Option<UtxoEntry> {
        self.utxos.insert(outpoint, entry)
    }

    pub fn remove(&mut self, outpoint: &TransactionOutpoint) -> Option<UtxoEntry> {
        self.utxos.remove(outpoint)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, TransactionOutpoint, UtxoEntry> {
        self.utxos.iter()
    }

    /// Sum of all entry amounts
    pub fn total_amount(&self) -> u128 {
        self.utxos.values().map(|e| e.amount as u128).sum()
    }

    /// Applies `diff` in place: removals first, each of which must match the
    /// stored entry exactly, then additions, which must not collide.
    pub fn apply_diff(&mut self, diff: &UtxoDiff) -> UtxoAlgebraResult<()> {
        for (outpoint, entry) in diff.remove.iter() {
            match self.utxos.get(outpoint) {
                None => return Err(UtxoAlgebraError::MissingForRemoval(*outpoint)),
                Some(existing) if existing != entry => return Err(UtxoAlgebraError::EntryMismatch(*outpoint)),
                Some(_) => {
                    self.utxos.remove(outpoint);
                }
            }
        }
        for (outpoint, entry) in diff.add.iter() {
            if self.utxos.contains_key(outpoint) {
                return Err(UtxoAlgebraError::AlreadyPresent(*outpoint));
            }
            self.utxos.insert(*outpoint, entry.clone());
        }
        Ok(())
    }
}

impl FromIterator<(TransactionOutpoint, UtxoEntry)> for UtxoCollection {
    fn from_iter<I: IntoIterator<Item = (TransactionOutpoint, UtxoEntry)>>(iter: I) -> Self {
        Self { utxos: iter.into_iter().collect() }
    }
}

impl IntoIterator for UtxoCollection {
    type Item = (TransactionOutpoint, UtxoEntry);
    type IntoIter = hash_map::IntoIter<TransactionOutpoint, UtxoEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.into_iter()
    }
}

impl<'a> IntoIterator for &'a UtxoCollection {
    type Item = (&'a TransactionOutpoint, &'a UtxoEntry);
    type IntoIter = hash_map::Iter<'a, TransactionOutpoint, UtxoEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::ScriptPublicKey;
    use crate::Hash;

    fn op(i: u64) -> TransactionOutpoint {
        TransactionOutpoint::new(Hash::from_u64_word(i), 0)
    }

    fn entry(amount: u64) -> UtxoEntry {
        UtxoEntry::new(amount, ScriptPublicKey::new(0, vec![0x51]), 1, false)
    }

    #[test]
    fn apply_removes_then_adds() {
        let mut set: UtxoCollection = [(op(1), entry(10))].into_iter().collect();
        let mut diff = UtxoDiff::default();
        diff.remove.insert(op(1), entry(10));
        diff.add.insert(op(1), entry(20));
        set.apply_diff(&diff).unwrap();
        assert_eq!(set.get(&op(1)), Some(&entry(20)));
        assert_eq!(set.total_amount(), 20);
    }

    #[test]
    fn apply_rejects_mismatches() {
        let mut set: UtxoCollection = [(op(1), entry(10))].into_iter().collect();

        let mut diff = UtxoDiff::default();
        diff.remove.insert(op(1), entry(11));
        assert_eq!(set.apply_diff(&diff), Err(UtxoAlgebraError::EntryMismatch(op(1))));

        let mut diff = UtxoDiff::default();
        diff.remove.insert(op(2), entry(10));
        assert_eq!(set.apply_diff(&diff), Err(UtxoAlgebraError::MissingForRemoval(op(2))));

        let mut diff = UtxoDiff::default();
        diff.add.insert(op(1), entry(10));
        assert_eq!(set.apply_diff(&diff), Err(UtxoAlgebraError::AlreadyPresent(op(1))));
    }
}
