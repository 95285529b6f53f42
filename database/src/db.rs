use crate::errors::{DbError, DbResult};
use crate::kv::{BatchOp, KeyValueStore};
use parking_lot::RwLock;
use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;

pub const CF_BLOCKS: &str = "blocks";
pub const CF_GHOSTDAG: &str = "ghostdag";
pub const CF_RELATIONS: &str = "relations";
pub const CF_UTXO_DIFFS: &str = "utxo_diffs";
pub const CF_MULTISETS: &str = "multisets";
pub const CF_VIRTUAL_UTXO_SET: &str = "virtual_utxo_set";
pub const CF_PRUNING_POINT_UTXO_SET: &str = "pruning_point_utxo_set";
pub const CF_METADATA: &str = "metadata";

pub const ALL_COLUMN_FAMILIES: [&str; 8] = [
    CF_BLOCKS,
    CF_GHOSTDAG,
    CF_RELATIONS,
    CF_UTXO_DIFFS,
    CF_MULTISETS,
    CF_VIRTUAL_UTXO_SET,
    CF_PRUNING_POINT_UTXO_SET,
    CF_METADATA,
];

/// RocksDB backend with one column family per namespace
pub struct Database {
    db: Arc<DB>,
    is_closed: Arc<RwLock<bool>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(10000);
        opts.set_keep_log_file_num(10);
        opts.set_max_background_jobs(4);
        opts.set_bytes_per_sync(1048576);
        opts.increase_parallelism(4);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_write_buffer_size(64 * 1024 * 1024);
        opts.set_max_write_buffer_number(3);

        let cf_descriptors: Vec<_> =
            ALL_COLUMN_FAMILIES.iter().map(|name| ColumnFamilyDescriptor::new(*name, Options::default())).collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        tracing::debug!("opened RocksDB with {} column families", ALL_COLUMN_FAMILIES.len());
        Ok(Self { db: Arc::new(db), is_closed: Arc::new(RwLock::new(false)) })
    }

    fn check_closed(&self) -> DbResult<()> {
        if *self.is_closed.read() {
            return Err(DbError::DatabaseClosed);
        }
        Ok(())
    }

    fn get_cf_handle(&self, cf_name: &str) -> DbResult<&rocksdb::ColumnFamily> {
        self.db.cf_handle(cf_name).ok_or_else(|| DbError::ColumnFamilyNotFound(cf_name.to_string()))
    }

    /// Rejects every further operation. The files are released when the last handle drops.
    pub fn close(&self) {
        *self.is_closed.write() = true;
    }

}

impl KeyValueStore for Database {
    fn get(&self, cf_name: &str, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    fn exists(&self, cf_name: &str, key: &[u8]) -> DbResult<bool> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.get_pinned_cf(cf, key)?.is_some())
    }

    fn write_ops(&self, ops: &[BatchOp]) -> DbResult<()> {
        self.check_closed()?;
        let mut write_batch = WriteBatch::default();
        for op in ops {
            match op {
                BatchOp::Put { cf, key, value } => write_batch.put_cf(self.get_cf_handle(cf)?, key, value),
                BatchOp::Delete { cf, key } => write_batch.delete_cf(self.get_cf_handle(cf)?, key),
            }
        }
        self.db.write(write_batch)?;
        Ok(())
    }

    fn iterate_prefix(&self, cf_name: &str, prefix: &[u8]) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.check_closed()?;
        let cf = self.get_cf_handle(cf_name)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), is_closed: self.is_closed.clone() }
    }
}
