//! BitokPoW hash engine (yespower 1.0, N=2048, r=32, "BitokPoW")
//!
//! A digest runs in three phases:
//! - Expansion: PBKDF2-HMAC-SHA256 of SHA-256(input), salted with the
//!   personalization string, yields the 128r-byte working block
//! - SMix: S-box fill with Salsa20/2, then the two pwxform loops over an
//!   8 MiB scratchpad
//! - Finalization: HMAC-SHA256 keyed by the last 64 bytes of the block over
//!   the first 32 bytes of the expansion

use hmac::{Hmac, Mac};
use sha2::{Digest as _, Sha256};

use crate::error::{Error, Result};
use crate::params::{BITOKPOW_PARAMS, DIGEST_SIZE, HashParameters};
use crate::primitives::{
    SALSA_WORDS, Sbox, blockmix_pwxform, blockmix_salsa, integerify, wrap, xor_into,
};

/// 32-byte BitokPoW digest
pub type Digest = [u8; DIGEST_SIZE];

/// Anything that can produce a proof-of-work digest for a byte buffer
pub trait PowHash {
    fn digest(&mut self, input: &[u8]) -> Result<Digest>;
}

/// BitokPoW hasher
///
/// Holds the scratchpad, S-boxes and block buffers. Nothing is allocated
/// until the first digest; later digests on the same engine reuse the memory.
/// Engines are independent, so each thread can own one without locking.
pub struct HashEngine {
    /// Main scratchpad, 32r words per entry
    scratchpad: Vec<u32>,
    sbox: Sbox,
    /// Working block B (host-order words)
    block: Vec<u32>,
    /// Shuffled copy of B used inside the SMix loops
    mix: Vec<u32>,
}

impl HashEngine {
    /// Create an engine without reserving working memory
    pub const fn new() -> Self {
        Self {
            scratchpad: Vec::new(),
            sbox: Sbox::empty(),
            block: Vec::new(),
            mix: Vec::new(),
        }
    }

    /// Compute the BitokPoW digest of `input`
    ///
    /// Any length is accepted, including empty input.
    pub fn digest(&mut self, input: &[u8]) -> Result<Digest> {
        self.compute(&BITOKPOW_PARAMS, input)
    }

    pub(crate) fn compute(&mut self, params: &HashParameters, input: &[u8]) -> Result<Digest> {
        params.validate()?;
        let r = params.r() as usize;
        let n = params.n();

        self.reserve(r, n as usize)?;

        // Phase 1: expansion
        let prehash = Sha256::digest(input);
        let mut expanded = vec![0u8; 128 * r];
        pbkdf2::pbkdf2_hmac::<Sha256>(&prehash, params.personalization(), 1, &mut expanded);

        let mut message = [0u8; 32];
        message.copy_from_slice(&expanded[..32]);
        for (word, bytes) in self.block.iter_mut().zip(expanded.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        // Phase 2: SMix
        self.smix(r, n);

        // Phase 3: finalization
        let mut key = [0u8; 64];
        for (bytes, word) in key
            .chunks_exact_mut(4)
            .zip(&self.block[self.block.len() - 16..])
        {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&key)
            .map_err(|e| Error::computation(format!("HMAC key rejected: {e}")))?;
        mac.update(&message);

        let mut out = [0u8; DIGEST_SIZE];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }

    /// Size every buffer for `(r, n)`, failing instead of aborting on OOM
    fn reserve(&mut self, r: usize, n: usize) -> Result<()> {
        let block_words = 32 * r;
        let scratchpad_words = block_words
            .checked_mul(n)
            .ok_or_else(|| Error::computation("scratchpad size overflows usize"))?;

        resize_fallible(&mut self.scratchpad, scratchpad_words)?;
        resize_fallible(self.sbox.words_mut(), Sbox::WORDS)?;
        resize_fallible(&mut self.block, block_words)?;
        resize_fallible(&mut self.mix, block_words)?;
        self.sbox.reset();
        Ok(())
    }

    fn smix(&mut self, r: usize, n: u32) {
        let nloop_all = n.div_ceil(3).next_multiple_of(2);
        let nloop_rw = nloop_all;

        self.fill_sbox();
        self.smix1(r, n);
        self.smix2(r, n, nloop_rw);
        self.smix2(r, n, nloop_all - nloop_rw);
    }

    /// SMix1 over r = 1 with BlockMix-Salsa, using the S-boxes as scratchpad
    fn fill_sbox(&mut self) {
        const S: usize = 2 * SALSA_WORDS;
        let x = &mut self.mix[..S];
        shuffle_in(x, &self.block[..S]);

        let sbox = self.sbox.words_mut();
        let entries = (sbox.len() / S) as u32;
        for i in 0..entries {
            let at = i as usize * S;
            sbox[at..at + S].copy_from_slice(x);
            if i > 1 {
                let j = wrap(integerify(x, 1), i) as usize;
                xor_into(x, &sbox[j * S..(j + 1) * S]);
            }
            blockmix_salsa(x);
        }

        shuffle_out(&mut self.block[..S], x);
    }

    /// First SMix loop: sequential scratchpad fill
    fn smix1(&mut self, r: usize, n: u32) {
        let s = 32 * r;
        let x = &mut self.mix[..s];
        shuffle_in(x, &self.block[..s]);

        for k in 1..r {
            x.copy_within((k - 1) * 32..k * 32, k * 32);
            blockmix_pwxform(&mut x[k * 32..(k + 1) * 32], &mut self.sbox, 1);
        }

        for i in 0..n {
            let at = i as usize * s;
            self.scratchpad[at..at + s].copy_from_slice(x);
            if i > 1 {
                let j = wrap(integerify(x, r), i) as usize;
                xor_into(x, &self.scratchpad[j * s..(j + 1) * s]);
            }
            blockmix_pwxform(x, &mut self.sbox, r);
        }

        shuffle_out(&mut self.block[..s], x);
    }

    /// Second SMix loop: data-dependent reads with write-back
    fn smix2(&mut self, r: usize, n: u32, nloop: u32) {
        let s = 32 * r;
        let x = &mut self.mix[..s];
        shuffle_in(x, &self.block[..s]);

        for _ in 0..nloop {
            let j = (integerify(x, r) & (n - 1)) as usize;
            let entry = &mut self.scratchpad[j * s..(j + 1) * s];
            xor_into(x, entry);
            if nloop != 2 {
                entry.copy_from_slice(x);
            }
            blockmix_pwxform(x, &mut self.sbox, r);
        }

        shuffle_out(&mut self.block[..s], x);
    }
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PowHash for HashEngine {
    fn digest(&mut self, input: &[u8]) -> Result<Digest> {
        HashEngine::digest(self, input)
    }
}

fn resize_fallible(buf: &mut Vec<u32>, len: usize) -> Result<()> {
    if buf.len() != len {
        buf.clear();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);
    }
    Ok(())
}

/// Copy 64-byte sub-blocks from `src` into `dst` in shuffled word order
#[inline(always)]
fn shuffle_in(dst: &mut [u32], src: &[u32]) {
    for (d, s) in dst
        .chunks_exact_mut(SALSA_WORDS)
        .zip(src.chunks_exact(SALSA_WORDS))
    {
        for (i, word) in d.iter_mut().enumerate() {
            *word = s[i * 5 % 16];
        }
    }
}

/// Inverse of [`shuffle_in`]
#[inline(always)]
fn shuffle_out(dst: &mut [u32], src: &[u32]) {
    for (d, s) in dst
        .chunks_exact_mut(SALSA_WORDS)
        .zip(src.chunks_exact(SALSA_WORDS))
    {
        for (i, word) in s.iter().enumerate() {
            d[i * 5 % 16] = *word;
        }
    }
}

/// Convenience function for single-shot hashing
///
/// Creates a new engine, computes the digest and releases the 8 MiB of
/// working memory before returning. For repeated hashing on one thread,
/// prefer keeping a [`HashEngine`] around.
pub fn hash(input: &[u8]) -> Result<Digest> {
    HashEngine::new().digest(input)
}
