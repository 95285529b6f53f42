pub mod access;
pub mod block_store;
pub mod ghostdag_store;
pub mod metadata_store;
pub mod multiset_store;
pub mod relations_store;
pub mod utxo_diff_store;
pub mod utxo_set_store;

pub use block_store::BlockStore;
pub use ghostdag_store::GhostdagStore;
pub use metadata_store::{MetadataStore, VirtualState};
pub use multiset_store::MultisetStore;
pub use relations_store::RelationsStore;
pub use utxo_diff_store::UtxoDiffStore;
pub use utxo_set_store::UtxoSetStore;
