use crate::DbResult;
use serde::Serialize;
use std::fmt;

/// A staged write. Operations apply in insertion order when committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { cf: &'static str, key: Vec<u8>, value: Vec<u8> },
    Delete { cf: &'static str, key: Vec<u8> },
}

type CommitHook = Box<dyn FnOnce() + Send>;

/// Writes committed atomically through [`KeyValueStore::write`]. Cache updates
/// staged with [`StoreBatch::on_commit`] run only once the write succeeded.
#[derive(Default)]
pub struct StoreBatch {
    ops: Vec<BatchOp>,
    on_commit: Vec<CommitHook>,
}

impl fmt::Debug for StoreBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBatch").field("ops", &self.ops).field("on_commit", &self.on_commit.len()).finish()
    }
}

impl StoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, cf: &'static str, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put { cf, key: key.into(), value });
    }

    pub fn put_serialized<T: Serialize + ?Sized>(&mut self, cf: &'static str, key: impl Into<Vec<u8>>, value: &T) -> DbResult<()> {
        let bytes = bincode::serialize(value)?;
        self.put(cf, key, bytes);
        Ok(())
    }

    pub fn delete(&mut self, cf: &'static str, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete { cf, key: key.into() });
    }

    pub fn on_commit(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.on_commit.push(Box::new(hook));
    }

    /// Runs the staged hooks in staging order. Called by [`KeyValueStore::write`].
    fn committed(self) {
        for hook in self.on_commit {
            hook();
        }
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Durable key/value persistence with namespaces (column families)
pub trait KeyValueStore: Send + Sync {
    fn get(&self, cf: &str, key: &[u8]) -> DbResult<Option<Vec<u8>>>;

    fn put(&self, cf: &'static str, key: &[u8], value: &[u8]) -> DbResult<()> {
        let mut batch = StoreBatch::new();
        batch.put(cf, key, value.to_vec());
        self.write(batch)
    }

    fn delete(&self, cf: &'static str, key: &[u8]) -> DbResult<()> {
        let mut batch = StoreBatch::new();
        batch.delete(cf, key);
        self.write(batch)
    }

    fn exists(&self, cf: &str, key: &[u8]) -> DbResult<bool> {
        Ok(self.get(cf, key)?.is_some())
    }

    /// Applies `ops` atomically: either all of them or none
    fn write_ops(&self, ops: &[BatchOp]) -> DbResult<()>;

    /// Commits all operations of `batch` atomically, then runs its commit hooks
    fn write(&self, batch: StoreBatch) -> DbResult<()> {
        self.write_ops(batch.ops())?;
        batch.committed();
        Ok(())
    }

    /// All pairs whose key starts with `prefix`, in key order
    fn iterate_prefix(&self, cf: &str, prefix: &[u8]) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>>;

    fn count(&self, cf: &str) -> DbResult<usize> {
        Ok(self.iterate_prefix(cf, &[])?.len())
    }
}
