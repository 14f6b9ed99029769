//! Bit-depth quantizer with subtractive TPDF dither.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MIN_BIT_DEPTH: u32 = 2;
pub const MAX_BIT_DEPTH: u32 = 16;

/// Largest positive code of a signed `bits`-wide integer, `2^(bits-1) - 1`.
/// The most negative code is never produced, so the lattice is symmetric.
#[inline]
pub fn max_value(bits: u32) -> i32 {
    let bits = bits.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH);
    (1 << (bits - 1)) - 1
}

/// Round a float sample onto the integer lattice `[-max_val, max_val]`
/// (values outside [-1, 1] land outside it and are clipped downstream).
/// Halves round to even.
#[inline]
pub fn quantize(sample: f32, max_val: i32) -> i32 {
    (sample * max_val as f32).round_ties_even() as i32
}

#[inline]
pub fn dequantize(code: i32, max_val: i32) -> f32 {
    code as f32 / max_val as f32
}

/// Triangular-PDF dither source. The same draw must be added before
/// quantization and subtracted after it.
#[derive(Debug, Clone)]
pub struct Dither {
    rng: StdRng,
}

impl Dither {
    pub fn new(seed: u64) -> Self {
        Dither {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Difference of two uniform [0, 1) draws, scaled to one step at `bits`.
    #[inline]
    pub fn draw(&mut self, bits: u32) -> f32 {
        let bits = bits.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH);
        let a: f32 = self.rng.r#gen();
        let b: f32 = self.rng.r#gen();
        (a - b) / (1u32 << bits) as f32
    }
}
