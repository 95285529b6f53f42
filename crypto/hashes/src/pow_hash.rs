use crate::hashers::{HasherBase, ProofOfWorkHash};
use crate::Hash;

/// Hash writer that follows the proof-of-work header hashing rules:
/// PRE_POW_HASH || TIME || 32 zero byte padding || NONCE
#[derive(Clone)]
pub struct PowHash(ProofOfWorkHash);

impl PowHash {
    #[inline]
    pub fn new(pre_pow_hash: Hash, timestamp: u64) -> Self {
        let mut inner = ProofOfWorkHash::new();
        inner.update(pre_pow_hash).update(timestamp.to_le_bytes()).update([0u8; 32]);
        Self(inner)
    }

    #[inline(always)]
    pub fn finalize_with_nonce(&self, nonce: u64) -> Hash {
        let mut hasher = self.0.clone();
        hasher.update(nonce.to_le_bytes());
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_hash() {
        let pre_hash = Hash::from_le_u64([0x0706050403020100, 0x0f0e0d0c0b0a0908, 1, 2]);
        let timestamp = 1234567890;
        let nonce = 42;

        let hasher = PowHash::new(pre_hash, timestamp);
        let hash = hasher.finalize_with_nonce(nonce);

        // Hash should be deterministic
        assert_eq!(hash, PowHash::new(pre_hash, timestamp).finalize_with_nonce(nonce));

        // The state is reusable across nonces
        assert_ne!(hash, hasher.finalize_with_nonce(nonce + 1));

        // Timestamp is committed
        assert_ne!(hash, PowHash::new(pre_hash, timestamp + 1).finalize_with_nonce(nonce));
    }
}
