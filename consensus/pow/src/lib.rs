use consensus_core::{hashing, header::Header, BlueWorkType};
use kash_hashes::{Hash, PowHash};
use kash_math::Uint192;
use primitive_types::U256;

/// State is an intermediate data structure with pre-computed values to speed up mining.
#[derive(Clone)]
pub struct State {
    pub(crate) target: U256,
    // PRE_POW_HASH || TIME || 32 zero byte padding; without NONCE
    pub(crate) hasher: PowHash,
}

impl State {
    #[inline]
    pub fn new(header: &Header) -> Self {
        let target = compact_to_target(header.bits);
        // Zero out the time and nonce to produce pre-pow hash.
        let pre_pow_hash = hashing::header::hash_override_nonce_time(header, 0, 0);
        let hasher = PowHash::new(pre_pow_hash, header.timestamp);
        Self { target, hasher }
    }

    #[inline]
    #[must_use]
    /// PRE_POW_HASH || TIME || 32 zero byte padding || NONCE
    pub fn calculate_pow(&self, nonce: u64) -> U256 {
        let hash = self.hasher.finalize_with_nonce(nonce);
        hash_to_u256(&hash)
    }

    #[inline]
    #[must_use]
    pub fn check_pow(&self, nonce: u64) -> (bool, U256) {
        let pow = self.calculate_pow(nonce);
        // The pow hash must be less or equal than the claimed target.
        (pow <= self.target, pow)
    }

    /// Searches `nonces` for the first nonce satisfying the target
    pub fn find_nonce(&self, nonces: impl IntoIterator<Item = u64>) -> Option<u64> {
        nonces.into_iter().find(|nonce| self.check_pow(*nonce).0)
    }

    pub fn target(&self) -> U256 {
        self.target
    }
}

/// Checks the proof of work of a header against the target encoded in its own bits
pub fn check_header_pow(header: &Header) -> bool {
    State::new(header).check_pow(header.nonce).0
}

#[inline]
fn hash_to_u256(hash: &Hash) -> U256 {
    // Interpreted as a big-endian number
    U256::from_big_endian(hash.as_bytes())
}

/// Expands compact difficulty bits into the full target
pub fn compact_to_target(bits: u32) -> U256 {
    let size = (bits >> 24) as usize;
    let word = bits & 0x007f_ffff;
    if size <= 3 {
        U256::from(word >> (8 * (3 - size)))
    } else if size > 32 + 3 {
        U256::MAX
    } else {
        U256::from(word).checked_shl_or_max(8 * (size - 3))
    }
}

/// Work represented by a block with the given difficulty bits: 2^256 / (target + 1)
pub fn calc_work(bits: u32) -> BlueWorkType {
    let target = compact_to_target(bits);
    // (~target / (target + 1)) + 1 is equivalent to 2^256 / (target + 1) without overflowing
    let work = match target.checked_add(U256::one()) {
        Some(denominator) => (!target / denominator).saturating_add(U256::one()),
        None => U256::one(),
    };
    if work.0[3] != 0 {
        return Uint192::MAX;
    }
    Uint192([work.0[0], work.0[1], work.0[2]])
}

trait ShlOrMax {
    fn checked_shl_or_max(self, shift: usize) -> Self;
}

impl ShlOrMax for U256 {
    fn checked_shl_or_max(self, shift: usize) -> Self {
        if self.is_zero() {
            return self;
        }
        if self.bits() + shift > 256 {
            U256::MAX
        } else {
            self << shift
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::Hash;

    const EASY_BITS: u32 = 0x207f_ffff;

    fn header(bits: u32) -> Header {
        Header::new_finalized(1, vec![Hash::from_u64_word(1)], Hash::zeroed(), Hash::zeroed(), 1_000, bits, 0)
    }

    #[test]
    fn compact_expansion() {
        assert_eq!(compact_to_target(EASY_BITS), U256::from(0x7f_ffffu64) << (8 * 29));
        assert_eq!(compact_to_target(0x1d00_ffff), U256::from(0xffffu64) << (8 * 26));
        assert_eq!(compact_to_target(0x0300_1234), U256::from(0x1234u64));
    }

    #[test]
    fn easier_target_means_less_work() {
        let easy = calc_work(EASY_BITS);
        let hard = calc_work(0x1e7f_ffff);
        assert!(hard > easy);
        // Target close to 2^255 yields work 2
        assert_eq!(easy, Uint192::from(2u64));
    }

    #[test]
    fn easy_target_is_minable() {
        let mut h = header(EASY_BITS);
        let state = State::new(&h);
        let nonce = state.find_nonce(0..1_000).unwrap();
        h.nonce = nonce;
        h.finalize();
        assert!(check_header_pow(&h));
    }

    #[test]
    fn state_ignores_nonce_and_timestamp_in_pre_pow_hash() {
        let mut a = header(EASY_BITS);
        let mut b = a.clone();
        b.nonce = 77;
        // Same timestamp and different nonce share the pre-pow state
        assert_eq!(State::new(&a).calculate_pow(5), State::new(&b).calculate_pow(5));
        a.timestamp += 1;
        assert_ne!(State::new(&a).calculate_pow(5), State::new(&b).calculate_pow(5));
    }

    #[test]
    fn hardest_target_rejects() {
        let state = State::new(&header(0x0300_0001));
        assert_eq!(state.target(), U256::one());
        assert!(state.find_nonce(0..64).is_none());
    }
}
