use serde::{Deserialize, Serialize};

use crate::tx::{Transaction, TransactionOutpoint, UtxoEntry};
use crate::utxo::utxo_error::{UtxoAlgebraError, UtxoAlgebraResult};
use crate::utxo::UtxoCollection;

/// The UTXO changes caused by one or more blocks.
///
/// An identical (outpoint, entry) pair never appears on both sides. The same
/// outpoint may appear on both sides with different entries, meaning the old
/// entry was replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoDiff {
    pub add: UtxoCollection,
    pub remove: UtxoCollection,
}

impl UtxoDiff {
    pub fn new(add: UtxoCollection, remove: UtxoCollection) -> Self {
        Self { add, remove }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Records the creation of `entry` at `outpoint`
    pub fn add_entry(&mut self, outpoint: TransactionOutpoint, entry: UtxoEntry) -> UtxoAlgebraResult<()> {
        if self.remove.contains_entry(&outpoint, &entry) {
            self.remove.remove(&outpoint);
        } else if self.add.insert(outpoint, entry).is_some() {
            return Err(UtxoAlgebraError::DuplicateAdd(outpoint));
        }
        Ok(())
    }

    /// Records the spending of `entry` at `outpoint`
    pub fn remove_entry(&mut self, outpoint: TransactionOutpoint, entry: UtxoEntry) -> UtxoAlgebraResult<()> {
        if self.add.contains_entry(&outpoint, &entry) {
            self.add.remove(&outpoint);
        } else if self.remove.insert(outpoint, entry).is_some() {
            return Err(UtxoAlgebraError::DuplicateRemove(outpoint));
        }
        Ok(())
    }

    /// Composes `other` on top of `self`, so that applying the result equals
    /// applying `self` and then `other`.
    pub fn with_diff_in_place(&mut self, other: &UtxoDiff) -> UtxoAlgebraResult<()> {
        for (outpoint, entry) in other.remove.iter() {
            self.remove_entry(*outpoint, entry.clone())?;
        }
        for (outpoint, entry) in other.add.iter() {
            self.add_entry(*outpoint, entry.clone())?;
        }
        Ok(())
    }

    pub fn with_diff(&self, other: &UtxoDiff) -> UtxoAlgebraResult<UtxoDiff> {
        let mut clone = self.clone();
        clone.with_diff_in_place(other)?;
        Ok(clone)
    }

    /// The diff undoing this one
    pub fn as_reversed(&self) -> UtxoDiff {
        Self { add: self.remove.clone(), remove: self.add.clone() }
    }

    pub fn into_reversed(self) -> UtxoDiff {
        Self { add: self.remove, remove: self.add }
    }

    /// Adds the effect of a transaction whose spent entries are `entries`, in input order
    pub fn add_transaction(&mut self, tx: &Transaction, entries: &[UtxoEntry], block_daa_score: u64) -> UtxoAlgebraResult<()> {
        for (input, entry) in tx.inputs.iter().zip(entries) {
            self.remove_entry(input.previous_outpoint, entry.clone())?;
        }

        let tx_id = tx.id();
        let is_coinbase = tx.is_coinbase();
        for (i, output) in tx.outputs.iter().enumerate() {
            let outpoint = TransactionOutpoint::new(tx_id, i as u32);
            let entry = UtxoEntry::new(output.value, output.script_public_key.clone(), block_daa_score, is_coinbase);
            self.add_entry(outpoint, entry)?;
        }
        Ok(())
    }

    /// Net change in circulating amount: Σ added − Σ removed
    pub fn amount_delta(&self) -> i128 {
        self.add.total_amount() as i128 - self.remove.total_amount() as i128
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

    fn base_set() -> UtxoCollection {
        (1..=4).map(|i| (op(i), entry(i * 10))).collect()
    }

    #[test]
    fn add_then_remove_cancels() {
        let mut diff = UtxoDiff::default();
        diff.add_entry(op(9), entry(1)).unwrap();
        diff.remove_entry(op(9), entry(1)).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn replacement_keeps_both_sides() {
        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(1), entry(10)).unwrap();
        diff.add_entry(op(1), entry(11)).unwrap();
        assert_eq!(diff.remove.get(&op(1)), Some(&entry(10)));
        assert_eq!(diff.add.get(&op(1)), Some(&entry(11)));
    }

    #[test]
    fn duplicates_are_errors() {
        let mut diff = UtxoDiff::default();
        diff.add_entry(op(9), entry(1)).unwrap();
        assert_eq!(diff.add_entry(op(9), entry(2)), Err(UtxoAlgebraError::DuplicateAdd(op(9))));

        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(1), entry(10)).unwrap();
        assert_eq!(diff.remove_entry(op(1), entry(10)), Err(UtxoAlgebraError::DuplicateRemove(op(1))));
    }

    #[test]
    fn composition_matches_sequential_application() {
        let mut d1 = UtxoDiff::default();
        d1.remove_entry(op(1), entry(10)).unwrap();
        d1.add_entry(op(5), entry(50)).unwrap();
        d1.add_entry(op(6), entry(60)).unwrap();

        let mut d2 = UtxoDiff::default();
        d2.remove_entry(op(5), entry(50)).unwrap();
        d2.remove_entry(op(2), entry(20)).unwrap();
        d2.add_entry(op(1), entry(15)).unwrap();

        let mut sequential = base_set();
        sequential.apply_diff(&d1).unwrap();
        sequential.apply_diff(&d2).unwrap();

        let mut composed = base_set();
        composed.apply_diff(&d1.with_diff(&d2).unwrap()).unwrap();

        assert_eq!(sequential, composed);
    }

    #[test]
    fn composition_is_associative() {
        let mut d1 = UtxoDiff::default();
        d1.add_entry(op(5), entry(50)).unwrap();
        let mut d2 = UtxoDiff::default();
        d2.remove_entry(op(5), entry(50)).unwrap();
        d2.add_entry(op(6), entry(60)).unwrap();
        let mut d3 = UtxoDiff::default();
        d3.remove_entry(op(6), entry(60)).unwrap();
        d3.remove_entry(op(3), entry(30)).unwrap();

        let left = d1.with_diff(&d2).unwrap().with_diff(&d3).unwrap();
        let right = d1.with_diff(&d2.with_diff(&d3).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn reverse_undoes_apply() {
        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(1), entry(10)).unwrap();
        diff.add_entry(op(1), entry(12)).unwrap();
        diff.add_entry(op(7), entry(70)).unwrap();

        let mut set = base_set();
        set.apply_diff(&diff).unwrap();
        set.apply_diff(&diff.as_reversed()).unwrap();
        assert_eq!(set, base_set());
        assert_eq!(diff.amount_delta(), 72);
        assert_eq!(diff.into_reversed().amount_delta(), -72);
    }
}
