//! # BitokPoW Core
//!
//! Proof-of-work hashing and block header verification for Bitok.
//!
//! The hash is yespower 1.0 with a fixed parameter set:
//!
//! - N = 2048 (8 MiB scratchpad)
//! - r = 32
//! - personalization `"BitokPoW"`
//!
//! A header meets a target when its digest, read as a little-endian 256-bit
//! integer, is lower than or equal to the target read the same way.
//!
//! ## Example
//!
//! ```rust
//! use bitokpow_core::{Target, hash, verify_block};
//!
//! // Single-shot hashing
//! let digest = hash(b"input data")?;
//! assert_eq!(digest.len(), 32);
//!
//! // Header verification against the easiest target
//! let header = [0u8; 80];
//! assert!(verify_block(&header, Target::MAX.as_bytes())?);
//!
//! // Reusable engine (avoids re-allocating 8 MiB per digest)
//! let mut engine = bitokpow_core::HashEngine::new();
//! let first = engine.digest(b"first")?;
//! let second = engine.digest(b"second")?;
//! assert_ne!(first, second);
//! # Ok::<(), bitokpow_core::Error>(())
//! ```

mod engine;
mod error;
mod params;
mod primitives;
mod target;
mod verify;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use engine::{Digest, HashEngine, PowHash, hash};
pub use error::{Error, Result};
pub use params::*;
pub use target::{
    DIFF1_BE, SHARE_MULTIPLIER, Target, meets_target, meets_target_wide, share_difficulty,
};
pub use verify::{BlockHeader, verify_block, verify_block_with, verify_header};
