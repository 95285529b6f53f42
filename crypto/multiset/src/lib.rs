//! Elliptic-curve multiset hash over secp256k1.
//!
//! Every element is mapped onto a curve point and the set is represented by
//! the sum of its points, so insertions and removals commute. The empty set
//! is the point at infinity.

use kash_hashes::hashers::{Hasher, HasherBase, MuHashElementHash, MuHashFinalizeHash};
use kash_hashes::Hash;
use once_cell::sync::Lazy;
use secp256k1::{PublicKey, Secp256k1, VerifyOnly};
use std::fmt;
use thiserror::Error;

/// Size of the serialized multiset (uncompressed point without the tag byte)
pub const MULTISET_SIZE: usize = 64;

static SECP: Lazy<Secp256k1<VerifyOnly>> = Lazy::new(Secp256k1::verification_only);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisetError {
    #[error("invalid multiset length: expected {MULTISET_SIZE}, got {0}")]
    InvalidLength(usize),

    #[error("multiset bytes do not encode a curve point")]
    InvalidPoint,
}

#[derive(Clone, Copy, Default)]
pub struct Multiset {
    point: Option<PublicKey>,
}

impl Multiset {
    pub fn new() -> Self {
        Self { point: None }
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_none()
    }

    pub fn add_element(&mut self, data: &[u8]) {
        self.add_point(element_to_point(data));
    }

    pub fn remove_element(&mut self, data: &[u8]) {
        let point = element_to_point(data).negate(&SECP);
        self.add_point(point);
    }

    /// Adds all elements of `other` into `self`
    pub fn combine(&mut self, other: &Multiset) {
        if let Some(point) = other.point {
            self.add_point(point);
        }
    }

    fn add_point(&mut self, point: PublicKey) {
        self.point = match self.point {
            None => Some(point),
            // The only failing sum is the point at infinity
            Some(current) => current.combine(&point).ok(),
        };
    }

    pub fn finalize(&self) -> Hash {
        let mut hasher = MuHashFinalizeHash::new();
        hasher.update(self.to_bytes());
        hasher.finalize()
    }

    pub fn to_bytes(&self) -> [u8; MULTISET_SIZE] {
        let mut out = [0u8; MULTISET_SIZE];
        if let Some(point) = self.point {
            out.copy_from_slice(&point.serialize_uncompressed()[1..]);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MultisetError> {
        if bytes.len() != MULTISET_SIZE {
            return Err(MultisetError::InvalidLength(bytes.len()));
        }
        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self::new());
        }
        let mut uncompressed = [0u8; MULTISET_SIZE + 1];
        uncompressed[0] = 0x04;
        uncompressed[1..].copy_from_slice(bytes);
        let point = PublicKey::from_slice(&uncompressed).map_err(|_| MultisetError::InvalidPoint)?;
        Ok(Self { point: Some(point) })
    }
}

/// Try-and-increment: hash (counter || data) until the digest is a valid x coordinate.
fn element_to_point(data: &[u8]) -> PublicKey {
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02;
    let mut counter = 0u64;
    loop {
        let mut hasher = MuHashElementHash::new();
        hasher.update(counter.to_le_bytes()).update(data);
        compressed[1..].copy_from_slice(hasher.finalize().as_bytes());
        if let Ok(point) = PublicKey::from_slice(&compressed) {
            return point;
        }
        counter += 1;
    }
}

impl PartialEq for Multiset {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Multiset {}

impl fmt::Debug for Multiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiset({})", self.finalize())
    }
}
