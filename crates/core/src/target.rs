//! Difficulty targets
//!
//! Digests and targets are 256-bit unsigned integers stored little-endian:
//! byte 0 is least significant, byte 31 most significant. A digest meets a
//! target when it is numerically lower than or equal to it.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigUint;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::engine::Digest;
use crate::error::{Error, Result};
use crate::params::TARGET_SIZE;

/// Difficulty-1 target, big-endian: `0x00007fffff` followed by 27 zero bytes
pub const DIFF1_BE: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[2] = 0x7f;
    bytes[3] = 0xff;
    bytes[4] = 0xff;
    bytes
};

/// Pool share difficulty multiplier for BitokPoW
pub const SHARE_MULTIPLIER: u32 = 32768;

/// Compare a digest against a target, scanning from the most significant byte
///
/// Stops at the first differing byte; equal values meet the target.
#[inline]
pub fn meets_target(digest: &Digest, target: &[u8; TARGET_SIZE]) -> bool {
    for (d, t) in digest.iter().rev().zip(target.iter().rev()) {
        match d.cmp(t) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => continue,
        }
    }
    true
}

/// [`meets_target`] computed on decoded 256-bit integers
pub fn meets_target_wide(digest: &Digest, target: &[u8; TARGET_SIZE]) -> bool {
    BigUint::from_bytes_le(digest) <= BigUint::from_bytes_le(target)
}

fn diff1() -> BigUint {
    BigUint::from_bytes_be(&DIFF1_BE)
}

/// Share difficulty of a digest: `diff1 / digest * SHARE_MULTIPLIER`
///
/// An all-zero digest has infinite difficulty.
pub fn share_difficulty(digest: &Digest) -> f64 {
    let value = BigUint::from_bytes_le(digest);
    if value.is_zero() {
        return f64::INFINITY;
    }
    ratio(&diff1(), &value) * SHARE_MULTIPLIER as f64
}

fn ratio(numerator: &BigUint, denominator: &BigUint) -> f64 {
    let n = numerator.to_f64().unwrap_or(f64::INFINITY);
    let d = denominator.to_f64().unwrap_or(f64::INFINITY);
    n / d
}

/// A 256-bit difficulty target in little-endian byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target([u8; TARGET_SIZE]);

impl Target {
    /// The easiest target, met by every digest
    pub const MAX: Target = Target([0xFF; TARGET_SIZE]);

    pub const fn from_le_bytes(bytes: [u8; TARGET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a target from a borrowed byte slice, which must be 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Error::check_size("target", TARGET_SIZE, bytes.len())?;
        let mut array = [0u8; TARGET_SIZE];
        array.copy_from_slice(bytes);
        Ok(Self(array))
    }

    /// Parse a hex string of the little-endian bytes
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex.trim())
            .map_err(|e| Error::argument(format!("target is not valid hex: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Decode a compact `nBits` value: `mantissa * 256^(exponent - 3)`
    pub fn from_compact(bits: u32) -> Result<Self> {
        let exponent = bits >> 24;
        let mantissa = BigUint::from(bits & 0x00ff_ffff);

        let value = if exponent >= 3 {
            mantissa << (8 * (exponent - 3))
        } else {
            mantissa >> (8 * (3 - exponent))
        };

        Self::from_biguint(&value)
            .map_err(|_| Error::argument(format!("compact target {bits:#010x} exceeds 256 bits")))
    }

    /// Target for a difficulty relative to diff1, clamped to [`Target::MAX`]
    pub fn from_difficulty(difficulty: f64) -> Result<Self> {
        if !difficulty.is_finite() || difficulty <= 0.0 {
            return Err(Error::argument(format!(
                "difficulty must be finite and positive, got {difficulty}"
            )));
        }

        let diff1 = diff1().to_f64().unwrap_or(f64::MAX);
        let quotient = diff1 / difficulty;
        if !quotient.is_finite() {
            return Ok(Self::MAX);
        }
        match BigUint::from_f64(quotient) {
            Some(value) => Ok(Self::from_biguint(&value).unwrap_or(Self::MAX)),
            None => Ok(Self::MAX),
        }
    }

    /// Fails when the value does not fit in 256 bits
    pub fn from_biguint(value: &BigUint) -> Result<Self> {
        let bytes = value.to_bytes_le();
        if bytes.len() > TARGET_SIZE {
            return Err(Error::argument("target exceeds 256 bits"));
        }
        let mut array = [0u8; TARGET_SIZE];
        array[..bytes.len()].copy_from_slice(&bytes);
        Ok(Self(array))
    }

    /// Re-encode as compact `nBits`, rounding the mantissa down
    pub fn to_compact(&self) -> u32 {
        let value = self.to_biguint();
        let mut size = value.to_bytes_be().len() as u32;
        if value.is_zero() {
            size = 0;
        }

        let mut compact = if size <= 3 {
            (&value << (8 * (3 - size))).to_u32().unwrap_or(0)
        } else {
            (&value >> (8 * (size - 3))).to_u32().unwrap_or(0)
        };

        // The mantissa is unsigned; keep its top bit clear
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }

        (size << 24) | compact
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; TARGET_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Difficulty of this target: `diff1 / target`
    pub fn difficulty(&self) -> f64 {
        let value = self.to_biguint();
        if value.is_zero() {
            return f64::INFINITY;
        }
        ratio(&diff1(), &value)
    }

    /// Whether `digest` is lower than or equal to this target
    pub fn is_met_by(&self, digest: &Digest) -> bool {
        meets_target(digest, &self.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_msb(byte: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = byte;
        bytes
    }

    #[test]
    fn equality_meets_target() {
        let value = [0x42u8; 32];
        assert!(meets_target(&value, &value));
        assert!(meets_target(&[0u8; 32], &[0u8; 32]));
    }

    #[test]
    fn most_significant_byte_decides() {
        // digest 0x01 << 248 vs target 0xFF (low byte only)
        let digest = with_msb(0x01);
        let mut target = [0u8; 32];
        target[0] = 0xFF;
        assert!(!meets_target(&digest, &target));
        assert!(meets_target(&target, &digest));
    }

    #[test]
    fn scan_stops_at_first_difference() {
        // High byte smaller, every lower byte larger: still meets
        let mut digest = [0xFFu8; 32];
        digest[31] = 0x10;
        let mut target = [0u8; 32];
        target[31] = 0x11;
        assert!(meets_target(&digest, &target));

        // Differ only in the least significant byte
        let mut low = [0x33u8; 32];
        let high = [0x33u8; 32];
        low[0] = 0x32;
        assert!(meets_target(&low, &high));
        assert!(!meets_target(&high, &low));
    }

    #[test]
    fn max_target_accepts_everything() {
        assert!(Target::MAX.is_met_by(&[0xFF; 32]));
        assert!(Target::MAX.is_met_by(&[0x00; 32]));
    }

    #[test]
    fn from_slice_checks_length() {
        assert_eq!(
            Target::from_slice(&[0u8; 31]),
            Err(Error::InputSize {
                argument: "target",
                expected: 32,
                actual: 31
            })
        );
        assert!(Target::from_slice(&[0u8; 33]).is_err());
        assert!(Target::from_slice(&[7u8; 32]).is_ok());
    }

    #[test]
    fn from_hex_errors() {
        assert!(matches!(Target::from_hex("zz"), Err(Error::Argument(_))));
        assert!(matches!(
            Target::from_hex("00ff"),
            Err(Error::InputSize { actual: 2, .. })
        ));
        let target = Target::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(target.as_bytes(), &[0xAB; 32]);
        assert_eq!(target.to_string(), "ab".repeat(32));
    }

    #[test]
    fn compact_bits_decode() {
        // 0x1d00ffff -> 0x00ffff * 256^26
        let target = Target::from_compact(0x1d00ffff).unwrap();
        let expected = BigUint::from(0xffffu32) << (8 * 26);
        assert_eq!(target.to_biguint(), expected);
        assert_eq!(target.as_bytes()[26], 0xff);
        assert_eq!(target.as_bytes()[27], 0xff);
        assert_eq!(target.as_bytes()[28], 0x00);

        // Small exponents shift right
        assert_eq!(
            Target::from_compact(0x0212_3456).unwrap().to_biguint(),
            BigUint::from(0x1234u32)
        );

        // Overflowing 256 bits is rejected
        assert!(matches!(
            Target::from_compact(0x2200_ffff),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn compact_bits_round_trip() {
        for bits in [0x1d00ffffu32, 0x1e0fffff, 0x1f00ffff, 0x1b0404cb, 0x2000ffff] {
            let target = Target::from_compact(bits).unwrap();
            assert_eq!(target.to_compact(), bits, "bits {bits:#x}");
        }
    }

    #[test]
    fn compact_keeps_mantissa_unsigned() {
        // 0x80 in the top mantissa byte moves into the exponent
        let target = Target::from_biguint(&BigUint::from(0x80u32)).unwrap();
        assert_eq!(target.to_compact(), 0x0200_8000);
    }

    #[test]
    fn diff1_difficulty_is_one() {
        let target = Target::from_biguint(&BigUint::from_bytes_be(&DIFF1_BE)).unwrap();
        assert!((target.difficulty() - 1.0).abs() < 1e-12);
        assert_eq!(target.to_compact(), 0x1e7fffff);
    }

    #[test]
    fn difficulty_round_trip() {
        for difficulty in [1.0, 2.0, 16.0, 1000.5, 123_456.0] {
            let target = Target::from_difficulty(difficulty).unwrap();
            let back = target.difficulty();
            assert!(
                (back - difficulty).abs() / difficulty < 1e-9,
                "difficulty {difficulty} came back as {back}"
            );
        }
    }

    #[test]
    fn easy_difficulty_clamps_to_max() {
        assert_eq!(Target::from_difficulty(1e-80).unwrap(), Target::MAX);
        // diff1 / difficulty overflows f64
        assert_eq!(Target::from_difficulty(1e-250).unwrap(), Target::MAX);
        assert_eq!(Target::from_difficulty(f64::MIN_POSITIVE).unwrap(), Target::MAX);
        assert_eq!(Target::from_difficulty(5e-324).unwrap(), Target::MAX);
    }

    #[test]
    fn rejects_bad_difficulty() {
        assert!(Target::from_difficulty(0.0).is_err());
        assert!(Target::from_difficulty(-1.0).is_err());
        assert!(Target::from_difficulty(f64::NAN).is_err());
        assert!(Target::from_difficulty(f64::INFINITY).is_err());
    }

    #[test]
    fn share_difficulty_scales_with_multiplier() {
        // A digest equal to diff1 is a difficulty-1 block, SHARE_MULTIPLIER shares
        let mut digest = DIFF1_BE;
        digest.reverse();
        assert!((share_difficulty(&digest) - SHARE_MULTIPLIER as f64).abs() < 1e-6);
        assert_eq!(share_difficulty(&[0u8; 32]), f64::INFINITY);
    }
}
