use crate::db::CF_METADATA;
use crate::errors::DbError;
use crate::kv::{KeyValueStore, StoreBatch};
use crate::DbResult;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::Hash;
use kash_multiset::Multiset;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

const TIPS_KEY: &[u8] = b"tips";
const VIRTUAL_STATE_KEY: &[u8] = b"virtual_state";
const PRUNING_POINT_KEY: &[u8] = b"pruning_point";

/// Persisted state of the virtual block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualState {
    pub parents: Vec<Hash>,
    pub ghostdag_data: GhostdagData,
    /// Circulating supply: sum of all virtual UTXO amounts
    pub coin_supply: u64,
    /// Multiset of the virtual UTXO set, in its 64-byte form
    pub multiset: Vec<u8>,
}

impl VirtualState {
    pub fn new(parents: Vec<Hash>, ghostdag_data: GhostdagData, coin_supply: u64, multiset: &Multiset) -> Self {
        Self { parents, ghostdag_data, coin_supply, multiset: multiset.to_bytes().to_vec() }
    }

    /// The selected parent of the virtual
    pub fn sink(&self) -> Hash {
        self.ghostdag_data.selected_parent
    }

    pub fn multiset(&self) -> DbResult<Multiset> {
        Multiset::from_bytes(&self.multiset).map_err(|err| DbError::InvalidData(format!("virtual multiset: {err}")))
    }
}

/// Singleton records: tips, virtual state and pruning point
pub struct MetadataStore {
    db: Arc<dyn KeyValueStore>,
}

impl MetadataStore {
    pub fn new(db: Arc<dyn KeyValueStore>) -> Self {
        Self { db }
    }

    fn read<T: DeserializeOwned>(&self, key: &[u8]) -> DbResult<Option<T>> {
        match self.db.get(CF_METADATA, key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_tips(&self) -> DbResult<Vec<Hash>> {
        Ok(self.read(TIPS_KEY)?.unwrap_or_default())
    }

    pub fn set_tips_batch(&self, batch: &mut StoreBatch, tips: &[Hash]) -> DbResult<()> {
        batch.put_serialized(CF_METADATA, TIPS_KEY, tips)
    }

    pub fn get_virtual_state(&self) -> DbResult<Option<VirtualState>> {
        self.read(VIRTUAL_STATE_KEY)
    }

    pub fn set_virtual_state_batch(&self, batch: &mut StoreBatch, state: &VirtualState) -> DbResult<()> {
        batch.put_serialized(CF_METADATA, VIRTUAL_STATE_KEY, state)
    }

    pub fn get_pruning_point(&self) -> DbResult<Option<Hash>> {
        self.read(PRUNING_POINT_KEY)
    }

    pub fn set_pruning_point_batch(&self, batch: &mut StoreBatch, pruning_point: Hash) -> DbResult<()> {
        batch.put_serialized(CF_METADATA, PRUNING_POINT_KEY, &pruning_point)
    }
}
