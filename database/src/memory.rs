use crate::errors::{DbError, DbResult};
use crate::kv::{BatchOp, KeyValueStore};
use crate::db::ALL_COLUMN_FAMILIES;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type ColumnFamily = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory backend with the same namespaces as [`crate::Database`]
pub struct MemoryDb {
    cfs: RwLock<HashMap<&'static str, ColumnFamily>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self { cfs: RwLock::new(ALL_COLUMN_FAMILIES.iter().map(|cf| (*cf, ColumnFamily::new())).collect()) }
    }
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryDb {
    fn get(&self, cf: &str, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        let cfs = self.cfs.read();
        let map = cfs.get(cf).ok_or_else(|| DbError::ColumnFamilyNotFound(cf.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn write_ops(&self, ops: &[BatchOp]) -> DbResult<()> {
        let mut cfs = self.cfs.write();
        // Validate first so that a failing batch leaves nothing behind
        for op in ops {
            let cf = match op {
                BatchOp::Put { cf, .. } | BatchOp::Delete { cf, .. } => cf,
            };
            if !cfs.contains_key(cf) {
                return Err(DbError::ColumnFamilyNotFound(cf.to_string()));
            }
        }
        for op in ops {
            match op {
                BatchOp::Put { cf, key, value } => {
                    if let Some(map) = cfs.get_mut(cf) {
                        map.insert(key.clone(), value.clone());
                    }
                }
                BatchOp::Delete { cf, key } => {
                    if let Some(map) = cfs.get_mut(cf) {
                        map.remove(key);
                    }
                }
            }
        }
        Ok(())
    }

    fn iterate_prefix(&self, cf: &str, prefix: &[u8]) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let cfs = self.cfs.read();
        let map = cfs.get(cf).ok_or_else(|| DbError::ColumnFamilyNotFound(cf.to_string()))?;
        Ok(map
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
