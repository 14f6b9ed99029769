//! Offline renderer: runs a buffer through a fresh engine and encodes WAV.

use crate::formula::CompiledFormula;

use super::engine::{CrusherEngine, CrusherParams, DEFAULT_MAX_BLOCK};

/// Process a mono buffer in host-sized blocks and return the result.
pub fn render_samples(
    input: &[f32],
    sample_rate: u32,
    params: &CrusherParams,
    formula: &CompiledFormula,
) -> Vec<f32> {
    let mut engine = CrusherEngine::new(sample_rate as f64, 1, DEFAULT_MAX_BLOCK);
    engine.reserve_for(formula);
    let mut output = input.to_vec();
    for block in output.chunks_mut(DEFAULT_MAX_BLOCK) {
        engine.process_block(&mut [block], params, formula);
    }
    output
}

/// Render a mono buffer to a 16-bit PCM WAV file.
pub fn render_wav(
    input: &[f32],
    sample_rate: u32,
    params: &CrusherParams,
    formula: &CompiledFormula,
) -> Vec<u8> {
    write_wav_mono(&render_samples(input, sample_rate, params, formula), sample_rate)
}

const PCM_FORMAT: u16 = 1;
const BYTES_PER_SAMPLE: u32 = 2;
/// `RIFF` size field counts everything after itself: `WAVE`, the 24-byte
/// `fmt ` chunk and the `data` chunk header.
const RIFF_OVERHEAD: u32 = 4 + 24 + 8;

/// Float sample to signed 16-bit, clipping outside [-1, 1].
fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode mono float samples as a 16-bit little-endian WAV.
fn write_wav_mono(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = samples.len() as u32 * BYTES_PER_SAMPLE;
    let mut out = Vec::with_capacity((8 + RIFF_OVERHEAD + data_len) as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(RIFF_OVERHEAD + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    for field in [PCM_FORMAT, 1] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * BYTES_PER_SAMPLE).to_le_bytes());
    for field in [BYTES_PER_SAMPLE as u16, 8 * BYTES_PER_SAMPLE as u16] {
        out.extend_from_slice(&field.to_le_bytes());
    }

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend(samples.iter().flat_map(|&s| to_pcm16(s).to_le_bytes()));
    out
}
