//! Mixing primitives for yespower 1.0
//!
//! All blocks are slices of 32-bit words in host order. Blocks inside the
//! SMix loops are kept in the SIMD-shuffled layout (word `i` of a 64-byte
//! sub-block holds original word `i * 5 mod 16`); `salsa20` undoes and
//! redoes that shuffle around the core rounds.

use crate::params::{
    PWX_GATHER, PWX_ROUNDS, PWX_SIMPLE, PWX_WORDS, S_MASK, SALSA20_ROUNDS, SBOX_PAIRS,
};

/// 32-bit words in one Salsa20 block
pub(crate) const SALSA_WORDS: usize = 16;

#[inline(always)]
pub(crate) fn xor_into(dst: &mut [u32], src: &[u32]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// Apply the Salsa20 core with `rounds` rounds to a shuffled 16-word block
pub(crate) fn salsa20(block: &mut [u32], rounds: usize) {
    debug_assert_eq!(block.len(), SALSA_WORDS);

    let mut x = [0u32; SALSA_WORDS];
    for (i, word) in block.iter().enumerate() {
        x[i * 5 % 16] = *word;
    }

    macro_rules! quarter {
        ($a:expr, $b:expr, $c:expr, $d:expr) => {
            x[$b] ^= x[$a].wrapping_add(x[$d]).rotate_left(7);
            x[$c] ^= x[$b].wrapping_add(x[$a]).rotate_left(9);
            x[$d] ^= x[$c].wrapping_add(x[$b]).rotate_left(13);
            x[$a] ^= x[$d].wrapping_add(x[$c]).rotate_left(18);
        };
    }

    for _ in (0..rounds).step_by(2) {
        // columns
        quarter!(0, 4, 8, 12);
        quarter!(5, 9, 13, 1);
        quarter!(10, 14, 2, 6);
        quarter!(15, 3, 7, 11);
        // rows
        quarter!(0, 1, 2, 3);
        quarter!(5, 6, 7, 4);
        quarter!(10, 11, 8, 9);
        quarter!(15, 12, 13, 14);
    }

    for (i, word) in block.iter_mut().enumerate() {
        *word = word.wrapping_add(x[i * 5 % 16]);
    }
}

/// BlockMix with Salsa20/2 over a single 128-byte block (r = 1)
pub(crate) fn blockmix_salsa(block: &mut [u32]) {
    debug_assert_eq!(block.len(), 2 * SALSA_WORDS);

    let mut x = [0u32; SALSA_WORDS];
    x.copy_from_slice(&block[SALSA_WORDS..]);

    for chunk in block.chunks_exact_mut(SALSA_WORDS) {
        xor_into(&mut x, chunk);
        salsa20(&mut x, SALSA20_ROUNDS);
        chunk.copy_from_slice(&x);
    }
}

/// Integerify: low 32 bits of the last 64-byte sub-block
#[inline(always)]
pub(crate) fn integerify(block: &[u32], r: usize) -> u32 {
    block[(2 * r - 1) * SALSA_WORDS]
}

/// Largest power of two not greater than `x`
#[inline(always)]
pub(crate) fn p2floor(x: u32) -> u32 {
    debug_assert!(x > 0);
    1 << (31 - x.leading_zeros())
}

/// Map `x` into `0..i` for a non power-of-two `i`
#[inline(always)]
pub(crate) fn wrap(x: u32, i: u32) -> u32 {
    let n = p2floor(i);
    (x & (n - 1)) + (i - n)
}

/// The three rotating pwxform S-boxes and their write pointer
///
/// The boxes live back to back in one word buffer; `s0`, `s1` and `s2` are
/// word offsets into it and `w` counts lane pairs.
pub(crate) struct Sbox {
    words: Vec<u32>,
    s0: usize,
    s1: usize,
    s2: usize,
    w: usize,
}

impl Sbox {
    /// Words per S-box
    const BOX_WORDS: usize = SBOX_PAIRS * 2;

    /// Total words across S0, S1 and S2
    pub(crate) const WORDS: usize = 3 * Self::BOX_WORDS;

    pub(crate) const fn empty() -> Self {
        Self {
            words: Vec::new(),
            s0: 0,
            s1: Self::BOX_WORDS,
            s2: 2 * Self::BOX_WORDS,
            w: 0,
        }
    }

    pub(crate) fn words_mut(&mut self) -> &mut Vec<u32> {
        &mut self.words
    }

    /// Restore box order and write pointer before a new digest
    pub(crate) fn reset(&mut self) {
        self.s0 = 0;
        self.s1 = Self::BOX_WORDS;
        self.s2 = 2 * Self::BOX_WORDS;
        self.w = 0;
    }

    #[inline(always)]
    fn pair(&self, offset: usize) -> u64 {
        ((self.words[offset + 1] as u64) << 32) | self.words[offset] as u64
    }

    /// Transform one 64-byte block in place through the S-boxes
    pub(crate) fn pwxform(&mut self, x: &mut [u32; PWX_WORDS]) {
        let (s0, s1, s2) = (self.s0, self.s1, self.s2);
        let mut w = self.w;

        for round in 0..PWX_ROUNDS {
            for j in 0..PWX_GATHER {
                let base = j * PWX_SIMPLE * 2;
                let p0 = s0 + (x[base] & S_MASK) as usize / 8 * 2;
                let p1 = s1 + (x[base + 1] & S_MASK) as usize / 8 * 2;

                for k in 0..PWX_SIMPLE {
                    let lane = base + k * 2;
                    let mut v = (x[lane + 1] as u64) * (x[lane] as u64);
                    v = v.wrapping_add(self.pair(p0 + k * 2));
                    v ^= self.pair(p1 + k * 2);
                    x[lane] = v as u32;
                    x[lane + 1] = (v >> 32) as u32;
                }

                if round == 0 || j < PWX_GATHER / 2 {
                    if j & 1 == 1 {
                        for k in 0..PWX_SIMPLE {
                            let lane = base + k * 2;
                            self.words[s1 + w * 2] = x[lane];
                            self.words[s1 + w * 2 + 1] = x[lane + 1];
                            w += 1;
                        }
                    } else {
                        for k in 0..PWX_SIMPLE {
                            let lane = base + k * 2;
                            self.words[s0 + (w + k) * 2] = x[lane];
                            self.words[s0 + (w + k) * 2 + 1] = x[lane + 1];
                        }
                    }
                }
            }
        }

        // (S0, S1, S2) <- (S2, S0, S1)
        self.s0 = s2;
        self.s1 = s0;
        self.s2 = s1;
        self.w = w & (SBOX_PAIRS - 1);
    }
}

/// BlockMix with pwxform over a 128r-byte block
pub(crate) fn blockmix_pwxform(block: &mut [u32], sbox: &mut Sbox, r: usize) {
    debug_assert_eq!(block.len(), 32 * r);

    let r1 = 128 * r / (PWX_WORDS * 4);
    let mut x = [0u32; PWX_WORDS];
    x.copy_from_slice(&block[(r1 - 1) * PWX_WORDS..r1 * PWX_WORDS]);

    for chunk in block.chunks_exact_mut(PWX_WORDS) {
        if r1 > 1 {
            xor_into(&mut x, chunk);
        }
        sbox.pwxform(&mut x);
        chunk.copy_from_slice(&x);
    }

    let last = (r1 - 1) * PWX_WORDS * 4 / 64;
    salsa20(
        &mut block[last * SALSA_WORDS..(last + 1) * SALSA_WORDS],
        SALSA20_ROUNDS,
    );
}
