//! Block header verification
//!
//! Lengths are checked before any hashing: a malformed header or target never
//! costs a memory-hard evaluation.

use crate::engine::{HashEngine, PowHash};
use crate::error::{Error, Result};
use crate::params::HEADER_SIZE;
use crate::target::Target;

/// 80-byte block header, opaque to the verifier
pub type BlockHeader = [u8; HEADER_SIZE];

/// Check whether the digest of `header` meets `target`
///
/// `header` must be 80 bytes and `target` 32 bytes, checked in that order.
pub fn verify_block(header: &[u8], target: &[u8]) -> Result<bool> {
    verify_block_with(&mut HashEngine::new(), header, target)
}

/// [`verify_block`] with a caller-provided hasher
pub fn verify_block_with<H: PowHash>(hasher: &mut H, header: &[u8], target: &[u8]) -> Result<bool> {
    Error::check_size("header", HEADER_SIZE, header.len())?;
    let target = Target::from_slice(target)?;

    let digest = hasher.digest(header)?;
    Ok(target.is_met_by(&digest))
}

/// Typed form of [`verify_block`]; lengths are guaranteed by the types
pub fn verify_header(header: &BlockHeader, target: &Target) -> Result<bool> {
    let digest = HashEngine::new().digest(header)?;
    Ok(target.is_met_by(&digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Digest;

    /// Hasher that records calls and returns a fixed outcome
    struct Scripted {
        calls: usize,
        outcome: Result<Digest>,
    }

    impl Scripted {
        fn returning(outcome: Result<Digest>) -> Self {
            Self { calls: 0, outcome }
        }
    }

    impl PowHash for Scripted {
        fn digest(&mut self, _input: &[u8]) -> Result<Digest> {
            self.calls += 1;
            self.outcome.clone()
        }
    }

    #[test]
    fn short_header_is_rejected_before_hashing() {
        let mut hasher = Scripted::returning(Ok([0u8; 32]));
        for len in [0, 79, 81, 160] {
            let err = verify_block_with(&mut hasher, &vec![0u8; len], &[0xFF; 32]).unwrap_err();
            assert_eq!(
                err,
                Error::InputSize {
                    argument: "header",
                    expected: 80,
                    actual: len
                }
            );
        }
        assert_eq!(hasher.calls, 0);
    }

    #[test]
    fn bad_target_is_rejected_before_hashing() {
        let mut hasher = Scripted::returning(Ok([0u8; 32]));
        for len in [0, 31, 33] {
            let err = verify_block_with(&mut hasher, &[0u8; 80], &vec![0u8; len]).unwrap_err();
            assert_eq!(
                err,
                Error::InputSize {
                    argument: "target",
                    expected: 32,
                    actual: len
                }
            );
        }
        assert_eq!(hasher.calls, 0);
    }

    #[test]
    fn header_is_checked_first() {
        let mut hasher = Scripted::returning(Ok([0u8; 32]));
        let err = verify_block_with(&mut hasher, &[0u8; 10], &[0u8; 10]).unwrap_err();
        assert!(matches!(err, Error::InputSize { argument: "header", .. }));
    }

    #[test]
    fn computation_error_propagates_unchanged() {
        let failure = Error::computation("out of memory");
        let mut hasher = Scripted::returning(Err(failure.clone()));
        let err = verify_block_with(&mut hasher, &[0u8; 80], &[0xFF; 32]).unwrap_err();
        assert_eq!(err, failure);
        assert_eq!(hasher.calls, 1);
    }

    #[test]
    fn compares_scripted_digest() {
        let mut digest = [0u8; 32];
        digest[31] = 0x10;

        let mut target = [0u8; 32];
        target[31] = 0x10;
        let mut hasher = Scripted::returning(Ok(digest));
        assert!(verify_block_with(&mut hasher, &[0u8; 80], &target).unwrap());

        target[31] = 0x0F;
        target[0] = 0xFF;
        assert!(!verify_block_with(&mut hasher, &[0u8; 80], &target).unwrap());
    }
}
