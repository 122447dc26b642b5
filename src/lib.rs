//! BitokPoW Tool Library
//!
//! Proof-of-work hashing and block header verification for Bitok, plus the
//! benchmark and reporting pieces behind the `bitokpow` command.
//!
//! # Overview
//!
//! BitokPoW is yespower 1.0 with N = 2048, r = 32 and the personalization
//! string `"BitokPoW"`. Each digest walks an 8 MiB scratchpad, so hashing
//! stays bound by memory latency rather than raw compute.
//!
//! # Example
//!
//! ```rust
//! use bitokpow::pow::{Target, hash, verify_block};
//!
//! // An 80-byte block header
//! let header = [0u8; 80];
//!
//! // Compute its digest
//! let digest = hash(&header)?;
//!
//! // Check it against the difficulty-1 target
//! let target = Target::from_compact(0x1e7fffff)?;
//! if verify_block(&header, target.as_bytes())? {
//!     println!("Header meets target: {}", hex::encode(digest));
//! }
//! # Ok::<(), bitokpow::pow::Error>(())
//! ```

// Re-export the core algorithm
pub use bitokpow_core as pow;

pub mod benchmark;
pub mod report;

// Convenience re-exports
pub use pow::{Error, HashEngine, Target, hash, verify_block};
