use super::HasherExtensions;
use crate::header::Header;
use kash_hashes::{hashers::BlockHash, Hash, HasherBase};

/// Returns the header hash with the nonce and timestamp replaced by the given values.
/// Zeroing both yields the pre-PoW hash mined over.
#[inline]
pub fn hash_override_nonce_time(header: &Header, nonce: u64, timestamp: u64) -> Hash {
    let mut hasher = BlockHash::new();
    hasher.write_u16(header.version).write_len(header.parents.len());
    for parent in header.parents.iter() {
        hasher.update(parent);
    }
    hasher
        .update(header.hash_merkle_root)
        .update(header.utxo_commitment)
        .write_u64(timestamp)
        .write_u32(header.bits)
        .write_u64(nonce);
    hasher.finalize()
}

/// Returns the header hash
#[inline]
pub fn hash(header: &Header) -> Hash {
    hash_override_nonce_time(header, header.nonce, header.timestamp)
}
