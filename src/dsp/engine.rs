//! Crusher Engine: the per-sample effects chain.
//!
//! For every channel and sample: evaluate the formula, sample-and-hold down
//! to the target rate, add dither, quantize, shift and clip, remove the
//! dither, and finally blend against the dry input. `process_block` never
//! allocates, locks, or logs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluator::Evaluator;
use crate::formula::CompiledFormula;

use super::bytebeat::{TimeCounter, output_to_sample, sample_to_input};
use super::mixer::DryWetMixer;
use super::quantizer::{Dither, MAX_BIT_DEPTH, MIN_BIT_DEPTH, dequantize, max_value, quantize};
use super::reducer::{SampleAndHold, reduction_factor};
use super::shifter::{MAX_BIT_SHIFT, shift_and_clip};

/// Block size the engine preallocates for when the host gives none.
pub const DEFAULT_MAX_BLOCK: usize = 1024;
/// Evaluation stack reserved up front. Formulas deeper than this evaluate to
/// 0 in `process_block` unless `reserve_for` ran before processing.
pub const DEFAULT_STACK_CAPACITY: usize = 256;
const DITHER_SEED: u64 = 0x5EED_B17E;

/// Control values read once per block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrusherParams {
    /// Effective output rate in Hz.
    pub target_sample_rate: f64,
    /// Quantizer resolution, 2 to 16 bits.
    pub bit_depth: u32,
    /// Subtractive TPDF dither on/off.
    pub dither: bool,
    /// Left shift applied to the quantized code, 0 to 64.
    pub bit_shift: u32,
    /// Dry/wet mix (0.0 = fully dry, 1.0 = fully wet).
    pub mix: f32,
}

impl Default for CrusherParams {
    fn default() -> Self {
        CrusherParams {
            target_sample_rate: 44100.0,
            bit_depth: 16,
            dither: true,
            bit_shift: 0,
            mix: 1.0,
        }
    }
}

impl CrusherParams {
    /// Clamp every control into its documented range.
    pub fn sanitized(&self) -> Self {
        CrusherParams {
            target_sample_rate: if self.target_sample_rate.is_finite() {
                self.target_sample_rate.max(1.0)
            } else {
                CrusherParams::default().target_sample_rate
            },
            bit_depth: self.bit_depth.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH),
            dither: self.dither,
            bit_shift: self.bit_shift.min(MAX_BIT_SHIFT),
            mix: if self.mix.is_nan() { 1.0 } else { self.mix.clamp(0.0, 1.0) },
        }
    }
}

/// Per-block constants derived from `CrusherParams`.
#[derive(Debug, Clone, Copy)]
struct BlockSettings {
    factor: usize,
    bit_depth: u32,
    max_val: i32,
    dither: bool,
    bit_shift: u32,
}

/// The real-time processor. Create and `prepare` it off the audio thread.
#[derive(Debug, Clone)]
pub struct CrusherEngine {
    sample_rate: f64,
    holds: Vec<SampleAndHold>,
    time: TimeCounter,
    evaluator: Evaluator,
    dither: Dither,
    mixer: DryWetMixer,
    /// Generation of the formula the clock and hold state belong to.
    generation: Option<u64>,
}

impl CrusherEngine {
    pub fn new(sample_rate: f64, channels: usize, max_block: usize) -> Self {
        let mut engine = CrusherEngine {
            sample_rate,
            holds: Vec::new(),
            time: TimeCounter::new(),
            evaluator: Evaluator::with_capacity(DEFAULT_STACK_CAPACITY),
            dither: Dither::new(DITHER_SEED),
            mixer: DryWetMixer::new(max_block.max(1)),
            generation: None,
        };
        engine.prepare(sample_rate, channels, max_block);
        engine
    }

    /// Replace the dither seed (tests and offline renders want repeatable noise).
    pub fn with_dither_seed(mut self, seed: u64) -> Self {
        self.dither = Dither::new(seed);
        self
    }

    /// (Re)start processing: size buffers and clear all running state.
    pub fn prepare(&mut self, sample_rate: f64, channels: usize, max_block: usize) {
        debug!(sample_rate, channels, max_block, "preparing crusher engine");
        self.sample_rate = sample_rate;
        self.holds = vec![SampleAndHold::new(); channels];
        if self.mixer.capacity() < max_block {
            self.mixer = DryWetMixer::new(max_block);
        }
        self.reset();
    }

    /// Zero the clock and every channel's hold state.
    pub fn reset(&mut self) {
        self.time.reset();
        for hold in &mut self.holds {
            hold.reset();
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.holds.len()
    }

    /// Current value of the formula clock.
    pub fn time(&self) -> u32 {
        self.time.peek()
    }

    /// Values the evaluation stack holds without reallocating.
    pub fn stack_capacity(&self) -> usize {
        self.evaluator.capacity()
    }

    /// Grow the evaluation stack to fit `formula`. Only call this where the
    /// engine is not owned by a running audio callback (offline rendering,
    /// or between `prepare` and the first block).
    pub fn reserve_for(&mut self, formula: &CompiledFormula) {
        self.evaluator.reserve(&formula.program);
    }

    /// Process one block in place. `channels[i]` is the i-th channel's
    /// buffer; channels beyond the prepared count are left untouched.
    pub fn process_block(
        &mut self,
        channels: &mut [&mut [f32]],
        params: &CrusherParams,
        formula: &CompiledFormula,
    ) {
        if self.generation != Some(formula.generation) {
            self.generation = Some(formula.generation);
            self.reset();
        }

        let params = params.sanitized();
        let settings = BlockSettings {
            factor: reduction_factor(self.sample_rate, params.target_sample_rate),
            bit_depth: params.bit_depth,
            max_val: max_value(params.bit_depth),
            dither: params.dither,
            bit_shift: params.bit_shift,
        };

        let chunk_len = self.mixer.capacity();
        for (ch, buffer) in channels.iter_mut().enumerate().take(self.holds.len()) {
            for chunk in buffer.chunks_mut(chunk_len) {
                self.mixer.capture(chunk);
                for sample in chunk.iter_mut() {
                    *sample = self.crush_sample(ch, *sample, formula, &settings);
                }
                self.mixer.apply(chunk, params.mix);
            }
        }
    }

    #[inline]
    fn crush_sample(
        &mut self,
        ch: usize,
        input: f32,
        formula: &CompiledFormula,
        settings: &BlockSettings,
    ) -> f32 {
        let t = self.time.advance();
        let value = self
            .evaluator
            .run(&formula.program, t, sample_to_input(input));
        let held = self.holds[ch].process(output_to_sample(value), settings.factor);

        let dither = if settings.dither {
            self.dither.draw(settings.bit_depth)
        } else {
            0.0
        };
        let code = quantize(held + dither, settings.max_val);
        let code = shift_and_clip(code, settings.bit_shift, settings.max_val);
        dequantize(code, settings.max_val) - dither
    }
}
