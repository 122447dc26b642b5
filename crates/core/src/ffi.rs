//! C FFI bindings for host runtimes
//!
//! Every entry point returns a status code; output buffers are written only
//! on success.

use crate::engine::{HashEngine, PowHash};
use crate::error::{Error, Result};
use crate::params::{DIGEST_SIZE, HEADER_SIZE, TARGET_SIZE};
use crate::verify::verify_block_with;
use core::slice;

/// Success
pub const BITOKPOW_OK: i32 = 0;
/// Null pointer or otherwise unusable argument
pub const BITOKPOW_ERR_ARGUMENT: i32 = -1;
/// Header or target has the wrong length
pub const BITOKPOW_ERR_INPUT_SIZE: i32 = -2;
/// The hash primitive failed
pub const BITOKPOW_ERR_COMPUTATION: i32 = -3;

/// bitokpow_verify_block: the header meets the target
pub const BITOKPOW_VERIFY_MET: i32 = 1;
/// bitokpow_verify_block: the header does not meet the target
///
/// Equal to `BITOKPOW_OK`; compare against this constant, not `BITOKPOW_OK`.
pub const BITOKPOW_VERIFY_NOT_MET: i32 = 0;

/// bitokpow_benchmark: a digest failed and no timing was taken
pub const BITOKPOW_BENCHMARK_FAILED: u64 = u64::MAX;

fn status(err: &Error) -> i32 {
    match err {
        Error::Argument(_) => BITOKPOW_ERR_ARGUMENT,
        Error::InputSize { .. } => BITOKPOW_ERR_INPUT_SIZE,
        Error::Computation(_) => BITOKPOW_ERR_COMPUTATION,
    }
}

/// Borrow `len` bytes at `ptr`; a null pointer is only allowed for empty input
unsafe fn input<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Opaque hasher handle for FFI
pub struct BitokHasher {
    inner: HashEngine,
}

/// Create a new hasher instance
/// Returns a pointer to the hasher (caller must free with bitokpow_hasher_free)
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_hasher_new() -> *mut BitokHasher {
    let hasher = Box::new(BitokHasher {
        inner: HashEngine::new(),
    });
    Box::into_raw(hasher)
}

/// Free a hasher instance
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_hasher_free(hasher: *mut BitokHasher) {
    if !hasher.is_null() {
        unsafe {
            let _ = Box::from_raw(hasher);
        }
    }
}

/// Compute a digest with a reusable hasher
/// - hasher: pointer from bitokpow_hasher_new()
/// - input: pointer to input bytes (may be null when input_len is 0)
/// - output: pointer to a 32-byte buffer for the digest
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_hasher_hash(
    hasher: *mut BitokHasher,
    input: *const u8,
    input_len: usize,
    output: *mut u8,
) -> i32 {
    if hasher.is_null() || output.is_null() {
        return BITOKPOW_ERR_ARGUMENT;
    }

    unsafe {
        let Some(data) = self::input(input, input_len) else {
            return BITOKPOW_ERR_ARGUMENT;
        };
        let hasher = &mut *hasher;
        match hasher.inner.digest(data) {
            Ok(digest) => {
                slice::from_raw_parts_mut(output, DIGEST_SIZE).copy_from_slice(&digest);
                BITOKPOW_OK
            }
            Err(err) => status(&err),
        }
    }
}

/// Compute the digest of input data
/// - input: pointer to input bytes (may be null when input_len is 0)
/// - output: pointer to a 32-byte buffer for the digest
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_hash(input: *const u8, input_len: usize, output: *mut u8) -> i32 {
    let hasher = bitokpow_hasher_new();
    let code = bitokpow_hasher_hash(hasher, input, input_len, output);
    bitokpow_hasher_free(hasher);
    code
}

/// Verify an 80-byte header against a 32-byte little-endian target
/// Returns BITOKPOW_VERIFY_MET (1), BITOKPOW_VERIFY_NOT_MET (0) or a negative
/// error status. A rejection shares its value with BITOKPOW_OK.
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_verify_block(
    header: *const u8,
    header_len: usize,
    target: *const u8,
    target_len: usize,
) -> i32 {
    if header.is_null() || target.is_null() {
        return BITOKPOW_ERR_ARGUMENT;
    }

    let (header, target) = unsafe {
        (
            slice::from_raw_parts(header, header_len),
            slice::from_raw_parts(target, target_len),
        )
    };

    match verify_block_with(&mut HashEngine::new(), header, target) {
        Ok(true) => BITOKPOW_VERIFY_MET,
        Ok(false) => BITOKPOW_VERIFY_NOT_MET,
        Err(err) => status(&err),
    }
}

/// Header length expected by bitokpow_verify_block
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_header_size() -> usize {
    HEADER_SIZE
}

/// Target length expected by bitokpow_verify_block
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_target_size() -> usize {
    TARGET_SIZE
}

/// Benchmark: compute N digests and return total microseconds
/// Returns BITOKPOW_BENCHMARK_FAILED if any digest fails
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_benchmark(iterations: u32) -> u64 {
    time_digests(&mut HashEngine::new(), iterations).unwrap_or(BITOKPOW_BENCHMARK_FAILED)
}

/// Hash `iterations` headers with varying nonces, stopping at the first error
fn time_digests<H: PowHash>(hasher: &mut H, iterations: u32) -> Result<u64> {
    use std::time::Instant;

    let mut header = [0u8; HEADER_SIZE];
    header[..16].copy_from_slice(b"Bitok test input");

    let start = Instant::now();
    for i in 0..iterations {
        header[HEADER_SIZE - 4..].copy_from_slice(&i.to_le_bytes());
        hasher.digest(&header)?;
    }

    // Saturate below the failure sentinel
    let micros = start.elapsed().as_micros();
    Ok(u64::try_from(micros).unwrap_or(u64::MAX).min(BITOKPOW_BENCHMARK_FAILED - 1))
}

/// Get hash rate (hashes per second) from a benchmark run
#[unsafe(no_mangle)]
pub extern "C" fn bitokpow_hashrate(iterations: u32, microseconds: u64) -> f64 {
    if microseconds == 0 {
        return 0.0;
    }
    (iterations as f64) / (microseconds as f64 / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ptr;

    #[test]
    fn null_pointers_are_argument_errors() {
        let mut out = [0u8; 32];
        assert_eq!(
            bitokpow_hash(ptr::null(), 4, out.as_mut_ptr()),
            BITOKPOW_ERR_ARGUMENT
        );
        assert_eq!(
            bitokpow_hash(b"data".as_ptr(), 4, ptr::null_mut()),
            BITOKPOW_ERR_ARGUMENT
        );
        assert_eq!(
            bitokpow_verify_block(ptr::null(), 80, [0u8; 32].as_ptr(), 32),
            BITOKPOW_ERR_ARGUMENT
        );
        assert_eq!(
            bitokpow_hasher_hash(ptr::null_mut(), ptr::null(), 0, out.as_mut_ptr()),
            BITOKPOW_ERR_ARGUMENT
        );
        // Output untouched on failure
        assert_eq!(out, [0u8; 32]);
    }

    #[test]
    fn wrong_sizes_are_reported() {
        let header = [0u8; 79];
        let target = [0xFFu8; 32];
        assert_eq!(
            bitokpow_verify_block(header.as_ptr(), header.len(), target.as_ptr(), 32),
            BITOKPOW_ERR_INPUT_SIZE
        );

        let header = [0u8; 80];
        assert_eq!(
            bitokpow_verify_block(header.as_ptr(), 80, target.as_ptr(), 31),
            BITOKPOW_ERR_INPUT_SIZE
        );
    }

    #[test]
    fn hash_matches_engine() {
        let mut out = [0u8; 32];
        assert_eq!(bitokpow_hash(b"abc".as_ptr(), 3, out.as_mut_ptr()), BITOKPOW_OK);
        assert_eq!(out, crate::hash(b"abc").unwrap());

        // Empty input with a null pointer is allowed
        let mut empty = [0u8; 32];
        assert_eq!(bitokpow_hash(ptr::null(), 0, empty.as_mut_ptr()), BITOKPOW_OK);
        assert_eq!(empty, crate::hash(&[]).unwrap());
    }

    #[test]
    fn reusable_handle() {
        let hasher = bitokpow_hasher_new();
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        assert_eq!(bitokpow_hasher_hash(hasher, b"x".as_ptr(), 1, first.as_mut_ptr()), BITOKPOW_OK);
        assert_eq!(bitokpow_hasher_hash(hasher, b"x".as_ptr(), 1, second.as_mut_ptr()), BITOKPOW_OK);
        bitokpow_hasher_free(hasher);
        assert_eq!(first, second);
    }

    #[test]
    fn verify_against_max_target() {
        let header = [0u8; 80];
        let target = [0xFFu8; 32];
        assert_eq!(
            bitokpow_verify_block(header.as_ptr(), 80, target.as_ptr(), 32),
            BITOKPOW_VERIFY_MET
        );
        let zero = [0u8; 32];
        assert_eq!(
            bitokpow_verify_block(header.as_ptr(), 80, zero.as_ptr(), 32),
            BITOKPOW_VERIFY_NOT_MET
        );
        assert_eq!(bitokpow_header_size(), 80);
        assert_eq!(bitokpow_target_size(), 32);
    }

    /// Succeeds a fixed number of times, then fails
    struct FailsAfter {
        remaining: usize,
        calls: usize,
    }

    impl PowHash for FailsAfter {
        fn digest(&mut self, _input: &[u8]) -> Result<crate::Digest> {
            self.calls += 1;
            if self.remaining == 0 {
                return Err(Error::computation("out of memory"));
            }
            self.remaining -= 1;
            Ok([0u8; 32])
        }
    }

    #[test]
    fn benchmark_stops_at_first_failure() {
        let mut hasher = FailsAfter {
            remaining: 2,
            calls: 0,
        };
        let err = time_digests(&mut hasher, 10).unwrap_err();
        assert!(matches!(err, Error::Computation(_)));
        assert_eq!(hasher.calls, 3);

        let mut healthy = FailsAfter {
            remaining: 5,
            calls: 0,
        };
        let micros = time_digests(&mut healthy, 5).unwrap();
        assert_ne!(micros, BITOKPOW_BENCHMARK_FAILED);
        assert_eq!(healthy.calls, 5);
    }

    #[test]
    fn benchmark_reports_success() {
        assert_ne!(bitokpow_benchmark(1), BITOKPOW_BENCHMARK_FAILED);
        assert_ne!(bitokpow_benchmark(0), BITOKPOW_BENCHMARK_FAILED);
    }

    #[test]
    fn hashrate_from_timing() {
        assert_eq!(bitokpow_hashrate(10, 0), 0.0);
        assert!((bitokpow_hashrate(10, 2_000_000) - 5.0).abs() < f64::EPSILON);
    }
}
