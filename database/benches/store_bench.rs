use consensus_core::tx::{ScriptPublicKey, TransactionOutpoint, UtxoEntry};
use consensus_core::utxo::UtxoDiff;
use consensus_core::Hash;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use database::db::CF_VIRTUAL_UTXO_SET;
use database::stores::UtxoSetStore;
use database::{Database, KeyValueStore, MemoryDb, StoreBatch};
use std::sync::Arc;
use tempfile::TempDir;

fn diff(size: u64) -> UtxoDiff {
    let mut diff = UtxoDiff::default();
    for i in 0..size {
        let outpoint = TransactionOutpoint::new(Hash::from_u64_word(i), 0);
        let entry = UtxoEntry::new(i, ScriptPublicKey::new(0, vec![0x51; 34]), i, false);
        let _ = diff.add_entry(outpoint, entry);
    }
    diff
}

fn bench_write_diff(c: &mut Criterion, name: &str, db: Arc<dyn KeyValueStore>) {
    let store = UtxoSetStore::new(db.clone(), CF_VIRTUAL_UTXO_SET, 0);
    let diff = diff(500);
    c.bench_function(name, |b| {
        b.iter_batched(
            StoreBatch::new,
            |mut batch| {
                let _ = store.write_diff_batch(&mut batch, &diff);
                let _ = db.write(batch);
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_backends(c: &mut Criterion) {
    bench_write_diff(c, "memory/write_diff_500", Arc::new(MemoryDb::new()));

    let tmp = TempDir::new().expect("tempdir");
    let rocks = Database::open(tmp.path()).expect("open rocksdb");
    bench_write_diff(c, "rocksdb/write_diff_500", Arc::new(rocks));
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
