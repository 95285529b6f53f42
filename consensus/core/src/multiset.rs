use crate::tx::{TransactionOutpoint, UtxoEntry};
use crate::utxo::UtxoDiff;
use kash_multiset::Multiset;

/// UTXO aware operations on a [`Multiset`]
pub trait MultisetExtensions {
    fn add_utxo(&mut self, outpoint: &TransactionOutpoint, entry: &UtxoEntry);
    fn remove_utxo(&mut self, outpoint: &TransactionOutpoint, entry: &UtxoEntry);
    /// Removes every entry of `diff.remove` and adds every entry of `diff.add`
    fn add_diff(&mut self, diff: &UtxoDiff);
}

impl MultisetExtensions for Multiset {
    fn add_utxo(&mut self, outpoint: &TransactionOutpoint, entry: &UtxoEntry) {
        self.add_element(&utxo_to_element_bytes(outpoint, entry));
    }

    fn remove_utxo(&mut self, outpoint: &TransactionOutpoint, entry: &UtxoEntry) {
        self.remove_element(&utxo_to_element_bytes(outpoint, entry));
    }

    fn add_diff(&mut self, diff: &UtxoDiff) {
        for (outpoint, entry) in diff.remove.iter() {
            self.remove_utxo(outpoint, entry);
        }
        for (outpoint, entry) in diff.add.iter() {
            self.add_utxo(outpoint, entry);
        }
    }
}

/// Serialized multiset element of a UTXO:
/// txid || index || daa score || amount || is coinbase || script version || script length || script
pub fn utxo_to_element_bytes(outpoint: &TransactionOutpoint, entry: &UtxoEntry) -> Vec<u8> {
    let script = entry.script_public_key.script();
    let mut bytes = Vec::with_capacity(32 + 4 + 8 + 8 + 1 + 2 + 8 + script.len());
    bytes.extend_from_slice(outpoint.transaction_id.as_bytes());
    bytes.extend_from_slice(&outpoint.index.to_le_bytes());
    bytes.extend_from_slice(&entry.block_daa_score.to_le_bytes());
    bytes.extend_from_slice(&entry.amount.to_le_bytes());
    bytes.push(entry.is_coinbase as u8);
    bytes.extend_from_slice(&entry.script_public_key.version().to_le_bytes());
    bytes.extend_from_slice(&(script.len() as u64).to_le_bytes());
    bytes.extend_from_slice(script);
    bytes
}

/// Builds the multiset of a whole UTXO set
pub fn multiset_from_utxos<'a>(utxos: impl IntoIterator<Item = (&'a TransactionOutpoint, &'a UtxoEntry)>) -> Multiset {
    let mut multiset = Multiset::new();
    for (outpoint, entry) in utxos {
        multiset.add_utxo(outpoint, entry);
    }
    multiset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::ScriptPublicKey;
    use crate::utxo::UtxoCollection;
    use crate::Hash;

    fn op(i: u64) -> TransactionOutpoint {
        TransactionOutpoint::new(Hash::from_u64_word(i), i as u32)
    }

    fn entry(amount: u64) -> UtxoEntry {
        UtxoEntry::new(amount, ScriptPublicKey::new(0, vec![0x51, 0x52]), 3, amount % 2 == 0)
    }

    #[test]
    fn element_layout() {
        let bytes = utxo_to_element_bytes(&op(1), &entry(7));
        assert_eq!(bytes.len(), 32 + 4 + 8 + 8 + 1 + 2 + 8 + 2);
        assert_eq!(&bytes[32..36], &1u32.to_le_bytes());
        assert_eq!(&bytes[44..52], &7u64.to_le_bytes());
    }

    #[test]
    fn diff_tracks_applied_set() {
        let mut set: UtxoCollection = (1..=5).map(|i| (op(i), entry(i))).collect();
        let mut multiset = multiset_from_utxos(&set);

        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(2), entry(2)).unwrap();
        diff.remove_entry(op(3), entry(3)).unwrap();
        diff.add_entry(op(3), entry(33)).unwrap();
        diff.add_entry(op(9), entry(9)).unwrap();

        set.apply_diff(&diff).unwrap();
        multiset.add_diff(&diff);
        assert_eq!(multiset.finalize(), multiset_from_utxos(&set).finalize());

        multiset.add_diff(&diff.as_reversed());
        set.apply_diff(&diff.as_reversed()).unwrap();
        assert_eq!(multiset.finalize(), multiset_from_utxos(&set).finalize());
    }
}
