//! BitokPoW Algorithm Parameters
//!
//! The parameter set is fixed for the lifetime of the chain. Every digest is
//! computed with [`BITOKPOW_PARAMS`]; there is no per-call override.

use crate::error::{Error, Result};

/// Cost factor (number of 128r-byte blocks in the main scratchpad)
pub const N: u32 = 2048;

/// Block-mix width
pub const R: u32 = 32;

/// Personalization string mixed in as the PBKDF2 salt
pub const PERSONALIZATION: &[u8] = b"BitokPoW";

/// Digest size in bytes
pub const DIGEST_SIZE: usize = 32;

/// Block header size in bytes
pub const HEADER_SIZE: usize = 80;

/// Target size in bytes
pub const TARGET_SIZE: usize = 32;

/// Main scratchpad size in bytes (8 MiB)
pub const SCRATCHPAD_SIZE: usize = 128 * R as usize * N as usize;

/// Total working memory per digest: scratchpad, S-boxes and the two block buffers
pub const TOTAL_MEMORY: usize = SCRATCHPAD_SIZE + SBOX_BYTES + 2 * 128 * R as usize;

pub(crate) const PWX_SIMPLE: usize = 2;
pub(crate) const PWX_GATHER: usize = 4;
pub(crate) const PWX_ROUNDS: usize = 3;
pub(crate) const S_WIDTH: u32 = 11;
pub(crate) const SALSA20_ROUNDS: usize = 2;

/// 32-bit words in one pwxform block (64 bytes)
pub(crate) const PWX_WORDS: usize = PWX_GATHER * PWX_SIMPLE * 2;

/// Lane pairs in a single S-box
pub(crate) const SBOX_PAIRS: usize = (1 << S_WIDTH) * PWX_SIMPLE;

/// Byte mask applied to a lane before it selects an S-box entry
pub(crate) const S_MASK: u32 = ((1 << S_WIDTH) - 1) * PWX_SIMPLE as u32 * 8;

/// Three S-boxes (S0, S1, S2), 96 KiB
pub const SBOX_BYTES: usize = 3 * SBOX_PAIRS * 8;

/// Hash function variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// yespower 1.0
    Base,
}

/// Parameterization of the memory-hard hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParameters {
    variant: Variant,
    n: u32,
    r: u32,
    personalization: &'static [u8],
}

/// The one parameter set used by every BitokPoW digest
pub const BITOKPOW_PARAMS: HashParameters = HashParameters {
    variant: Variant::Base,
    n: N,
    r: R,
    personalization: PERSONALIZATION,
};

impl HashParameters {
    #[cfg(test)]
    pub(crate) const fn new(n: u32, r: u32, personalization: &'static [u8]) -> Self {
        Self {
            variant: Variant::Base,
            n,
            r,
            personalization,
        }
    }

    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Cost factor
    pub const fn n(&self) -> u32 {
        self.n
    }

    /// Block-mix width
    pub const fn r(&self) -> u32 {
        self.r
    }

    pub const fn personalization(&self) -> &'static [u8] {
        self.personalization
    }

    /// Scratchpad bytes needed for these parameters
    pub const fn scratchpad_size(&self) -> usize {
        128 * self.r as usize * self.n as usize
    }

    /// Reject parameterizations the primitive cannot evaluate
    pub fn validate(&self) -> Result<()> {
        if self.n < 1024 || self.n > 512 * 1024 || !self.n.is_power_of_two() {
            return Err(Error::computation(format!(
                "cost factor N={} must be a power of two in 1024..=524288",
                self.n
            )));
        }
        if self.r < 8 || self.r > 32 {
            return Err(Error::computation(format!(
                "block-mix width r={} must be in 8..=32",
                self.r
            )));
        }
        Ok(())
    }
}
