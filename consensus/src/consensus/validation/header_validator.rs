//! Header validation for consensus
//!
//! This module validates block headers in isolation:
//! - Version and hash consistency
//! - Parent count and uniqueness
//! - Expected difficulty bits
//! - Proof of work

use consensus_core::config::params::Params;
use consensus_core::constants::BLOCK_VERSION;
use consensus_core::errors::{RuleError, RuleResult};
use consensus_core::header::Header;
use consensus_pow::check_header_pow;

/// Header validator for consensus rules
pub struct HeaderValidator {
    max_block_parents: usize,
    expected_bits: u32,
    skip_proof_of_work: bool,
}

impl HeaderValidator {
    pub fn new(params: &Params) -> Self {
        Self {
            max_block_parents: params.max_block_parents,
            expected_bits: params.block_bits,
            skip_proof_of_work: params.skip_proof_of_work,
        }
    }

    /// Validate a non-genesis header with context-free checks
    pub fn validate_header_in_isolation(&self, header: &Header) -> RuleResult<()> {
        if header.version != BLOCK_VERSION {
            return Err(RuleError::InvalidBlockVersion(header.version));
        }
        if !header.is_hash_consistent() {
            return Err(RuleError::BadHeaderHash(header.hash));
        }
        self.check_parents(header)?;
        if header.bits != self.expected_bits {
            return Err(RuleError::UnexpectedDifficulty { expected: self.expected_bits, found: header.bits });
        }
        self.check_pow(header)
    }

    /// Check parents validity
    pub fn check_parents(&self, header: &Header) -> RuleResult<()> {
        let direct_parents = header.direct_parents();
        if direct_parents.is_empty() {
            return Err(RuleError::NoParents);
        }
        if direct_parents.len() > self.max_block_parents {
            return Err(RuleError::TooManyParents(direct_parents.len(), self.max_block_parents));
        }
        if let Some(duplicate) = header.duplicate_parent() {
            return Err(RuleError::DuplicateParent(duplicate));
        }
        Ok(())
    }

    /// Check proof of work
    pub fn check_pow(&self, header: &Header) -> RuleResult<()> {
        if self.skip_proof_of_work || check_header_pow(header) {
            Ok(())
        } else {
            Err(RuleError::BadProofOfWork(header.hash))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::Hash;

    fn header(parents: Vec<Hash>, bits: u32) -> Header {
        Header::new_finalized(BLOCK_VERSION, parents, Hash::zeroed(), Hash::zeroed(), 1, bits, 0)
    }

    #[test]
    fn test_parent_rules() {
        let params = Params::simnet();
        let validator = HeaderValidator::new(&params);
        let p = |i| Hash::from_u64_word(i);

        assert!(validator.validate_header_in_isolation(&header(vec![p(1), p(2)], params.block_bits)).is_ok());
        assert_eq!(validator.validate_header_in_isolation(&header(vec![], params.block_bits)), Err(RuleError::NoParents));
        assert_eq!(
            validator.validate_header_in_isolation(&header(vec![p(1), p(1)], params.block_bits)),
            Err(RuleError::DuplicateParent(p(1)))
        );
        let many: Vec<Hash> = (0..params.max_block_parents as u64 + 1).map(p).collect();
        assert_eq!(
            validator.validate_header_in_isolation(&header(many, params.block_bits)),
            Err(RuleError::TooManyParents(params.max_block_parents + 1, params.max_block_parents))
        );
    }

    #[test]
    fn test_bits_version_and_hash() {
        let params = Params::simnet();
        let validator = HeaderValidator::new(&params);
        let parents = vec![Hash::from_u64_word(1)];

        let wrong_bits = header(parents.clone(), 0x1d00_ffff);
        assert!(matches!(validator.validate_header_in_isolation(&wrong_bits), Err(RuleError::UnexpectedDifficulty { .. })));

        let mut tampered = header(parents.clone(), params.block_bits);
        tampered.nonce = 9;
        assert_eq!(validator.validate_header_in_isolation(&tampered), Err(RuleError::BadHeaderHash(tampered.hash)));

        let mut old_version = header(parents, params.block_bits);
        old_version.version = 0;
        old_version.finalize();
        assert_eq!(validator.validate_header_in_isolation(&old_version), Err(RuleError::InvalidBlockVersion(0)));
    }

    #[test]
    fn test_pow_enforced_when_enabled() {
        let mut params = Params::simnet();
        params.skip_proof_of_work = false;
        // A target of 2^16 is practically never met
        params.block_bits = 0x0301_0000;
        let validator = HeaderValidator::new(&params);
        let hard = header(vec![Hash::from_u64_word(1)], params.block_bits);
        assert_eq!(validator.validate_header_in_isolation(&hard), Err(RuleError::BadProofOfWork(hard.hash)));
    }
}
