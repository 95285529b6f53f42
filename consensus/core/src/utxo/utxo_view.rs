use crate::errors::ConsensusResult;
use crate::tx::{TransactionOutpoint, UtxoEntry};
use crate::utxo::{UtxoCollection, UtxoDiff};

/// Read access to a UTXO state. Implemented by in-memory collections and by the stores.
pub trait UtxoView {
    fn get(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>>;
}

impl UtxoView for UtxoCollection {
    fn get(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>> {
        Ok(UtxoCollection::get(self, outpoint).cloned())
    }
}

impl<V: UtxoView + ?Sized> UtxoView for &V {
    fn get(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>> {
        (**self).get(outpoint)
    }
}

/// A base view with a diff applied on top of it, without materialising the result
pub struct ComposedUtxoView<'a, V: UtxoView + ?Sized> {
    base: &'a V,
    diff: &'a UtxoDiff,
}

impl<'a, V: UtxoView + ?Sized> ComposedUtxoView<'a, V> {
    pub fn new(base: &'a V, diff: &'a UtxoDiff) -> Self {
        Self { base, diff }
    }
}

impl<V: UtxoView + ?Sized> UtxoView for ComposedUtxoView<'_, V> {
    fn get(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>> {
        if let Some(entry) = self.diff.add.get(outpoint) {
            return Ok(Some(entry.clone()));
        }
        if self.diff.remove.contains(outpoint) {
            return Ok(None);
        }
        self.base.get(outpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::ScriptPublicKey;
    use crate::Hash;

    #[test]
    fn diff_overlays_base() {
        let op = |i| TransactionOutpoint::new(Hash::from_u64_word(i), 0);
        let entry = |a| UtxoEntry::new(a, ScriptPublicKey::default(), 0, false);
        let base: UtxoCollection = [(op(1), entry(1)), (op(2), entry(2))].into_iter().collect();

        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(1), entry(1)).unwrap();
        diff.remove_entry(op(2), entry(2)).unwrap();
        diff.add_entry(op(2), entry(22)).unwrap();
        diff.add_entry(op(3), entry(3)).unwrap();

        let view = ComposedUtxoView::new(&base, &diff);
        assert_eq!(view.get(&op(1)).unwrap(), None);
        assert_eq!(view.get(&op(2)).unwrap(), Some(entry(22)));
        assert_eq!(view.get(&op(3)).unwrap(), Some(entry(3)));
        assert_eq!(view.get(&op(4)).unwrap(), None);
    }
}
