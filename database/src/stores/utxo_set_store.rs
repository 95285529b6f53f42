use crate::cache::Cache;
use crate::errors::DbError;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::errors::ConsensusResult;
use consensus_core::tx::{TransactionOutpoint, UtxoEntry};
use consensus_core::utxo::{UtxoCollection, UtxoDiff, UtxoView};
use consensus_core::Hash;
use std::sync::Arc;

const OUTPOINT_KEY_SIZE: usize = 36;

/// A full UTXO set persisted in its own column family, keyed by `txid || index`
pub struct UtxoSetStore {
    db: Arc<dyn KeyValueStore>,
    cf: &'static str,
    cache: Arc<Cache<TransactionOutpoint, UtxoEntry>>,
}

impl UtxoSetStore {
    pub fn new(db: Arc<dyn KeyValueStore>, cf: &'static str, cache_size: usize) -> Self {
        Self { db, cf, cache: Arc::new(Cache::new(cache_size)) }
    }

    pub fn get_utxo(&self, outpoint: &TransactionOutpoint) -> DbResult<Option<UtxoEntry>> {
        if let Some(entry) = self.cache.get(outpoint) {
            return Ok(Some(entry));
        }
        match self.db.get(self.cf, &outpoint.to_key_bytes())? {
            Some(bytes) => {
                let entry: UtxoEntry = bincode::deserialize(&bytes)?;
                self.cache.insert(*outpoint, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Stages `diff`: removed outpoints are deleted, then added ones are written.
    /// The cache follows once the batch is committed.
    pub fn write_diff_batch(&self, batch: &mut StoreBatch, diff: &UtxoDiff) -> DbResult<()> {
        for (outpoint, _) in diff.remove.iter() {
            batch.delete(self.cf, outpoint.to_key_bytes().to_vec());
        }
        for (outpoint, entry) in diff.add.iter() {
            batch.put_serialized(self.cf, outpoint.to_key_bytes().to_vec(), entry)?;
        }
        let removed: Vec<TransactionOutpoint> = diff.remove.iter().map(|(o, _)| *o).collect();
        let added: Vec<(TransactionOutpoint, UtxoEntry)> = diff.add.iter().map(|(o, e)| (*o, e.clone())).collect();
        let cache = self.cache.clone();
        batch.on_commit(move || {
            for outpoint in removed {
                cache.remove(&outpoint);
            }
            for (outpoint, entry) in added {
                cache.insert(outpoint, entry);
            }
        });
        Ok(())
    }

    /// Stages the replacement of the whole set by `utxos`
    pub fn replace_batch(&self, batch: &mut StoreBatch, utxos: &UtxoCollection) -> DbResult<()> {
        for (key, _) in self.db.iterate_prefix(self.cf, &[])? {
            batch.delete(self.cf, key);
        }
        for (outpoint, entry) in utxos.iter() {
            batch.put_serialized(self.cf, outpoint.to_key_bytes().to_vec(), entry)?;
        }
        let cache = self.cache.clone();
        batch.on_commit(move || cache.clear());
        Ok(())
    }

    /// Loads the whole set into memory
    pub fn load_all(&self) -> DbResult<UtxoCollection> {
        self.db
            .iterate_prefix(self.cf, &[])?
            .into_iter()
            .map(|(key, value)| -> DbResult<(TransactionOutpoint, UtxoEntry)> { Ok((decode_outpoint(&key)?, bincode::deserialize(&value)?)) })
            .collect()
    }

    /// Sum of the amounts of all entries
    pub fn sum_amounts(&self) -> DbResult<u128> {
        let mut total: u128 = 0;
        for (_, value) in self.db.iterate_prefix(self.cf, &[])? {
            let entry: UtxoEntry = bincode::deserialize(&value)?;
            total = total.saturating_add(entry.amount as u128);
        }
        Ok(total)
    }
}

impl UtxoView for UtxoSetStore {
    fn get(&self, outpoint: &TransactionOutpoint) -> ConsensusResult<Option<UtxoEntry>> {
        Ok(self.get_utxo(outpoint)?)
    }
}

fn decode_outpoint(key: &[u8]) -> DbResult<TransactionOutpoint> {
    if key.len() != OUTPOINT_KEY_SIZE {
        return Err(DbError::InvalidData(format!("outpoint key of length {}", key.len())));
    }
    let transaction_id = Hash::try_from_slice(&key[..32]).map_err(|err| DbError::InvalidData(err.to_string()))?;
    let mut index = [0u8; 4];
    index.copy_from_slice(&key[32..]);
    Ok(TransactionOutpoint::new(transaction_id, u32::from_le_bytes(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CF_VIRTUAL_UTXO_SET;
    use crate::memory::MemoryDb;
    use consensus_core::tx::ScriptPublicKey;

    fn op(i: u64) -> TransactionOutpoint {
        TransactionOutpoint::new(Hash::from_u64_word(i), i as u32)
    }

    fn entry(amount: u64) -> UtxoEntry {
        UtxoEntry::new(amount, ScriptPublicKey::new(0, vec![0xac]), 2, false)
    }

    #[test]
    fn diffs_and_replacement() {
        let db: Arc<dyn KeyValueStore> = Arc::new(MemoryDb::new());
        let store = UtxoSetStore::new(db.clone(), CF_VIRTUAL_UTXO_SET, 8);

        let mut diff = UtxoDiff::default();
        diff.add_entry(op(1), entry(10)).unwrap();
        diff.add_entry(op(2), entry(20)).unwrap();
        let mut batch = StoreBatch::new();
        store.write_diff_batch(&mut batch, &diff).unwrap();
        db.write(batch).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
        assert_eq!(store.sum_amounts().unwrap(), 30);

        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(1), entry(10)).unwrap();
        diff.add_entry(op(1), entry(11)).unwrap();
        let mut batch = StoreBatch::new();
        store.write_diff_batch(&mut batch, &diff).unwrap();
        db.write(batch).unwrap();
        assert_eq!(UtxoView::get(&store, &op(1)).unwrap(), Some(entry(11)));

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(&op(2)), Some(&entry(20)));

        let replacement: UtxoCollection = [(op(7), entry(70))].into_iter().collect();
        let mut batch = StoreBatch::new();
        store.replace_batch(&mut batch, &replacement).unwrap();
        db.write(batch).unwrap();
        assert_eq!(store.load_all().unwrap(), replacement);
        assert_eq!(store.get_utxo(&op(1)).unwrap(), None);
    }

    #[test]
    fn failed_commit_keeps_cache_in_line_with_disk() {
        let db: Arc<dyn KeyValueStore> = Arc::new(MemoryDb::new());
        let store = UtxoSetStore::new(db.clone(), CF_VIRTUAL_UTXO_SET, 8);

        let mut diff = UtxoDiff::default();
        diff.add_entry(op(1), entry(10)).unwrap();
        let mut batch = StoreBatch::new();
        store.write_diff_batch(&mut batch, &diff).unwrap();
        db.write(batch).unwrap();
        assert_eq!(store.get_utxo(&op(1)).unwrap(), Some(entry(10)));

        let mut diff = UtxoDiff::default();
        diff.remove_entry(op(1), entry(10)).unwrap();
        diff.add_entry(op(2), entry(20)).unwrap();
        let mut batch = StoreBatch::new();
        store.write_diff_batch(&mut batch, &diff).unwrap();
        batch.put("missing", b"k".to_vec(), vec![]);
        assert!(db.write(batch).is_err());

        assert_eq!(store.get_utxo(&op(1)).unwrap(), Some(entry(10)));
        assert_eq!(store.get_utxo(&op(2)).unwrap(), None);
    }
}
