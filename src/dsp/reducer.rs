//! Sample-rate reducer: zero-order-hold decimation.
//!
//! No anti-aliasing filter is applied; the aliasing is the point.

/// Hold length for a target rate: `floor(engine / target)`, at least 1.
/// A target at or above the engine rate (or a non-positive one) passes
/// audio through unchanged.
pub fn reduction_factor(engine_rate: f64, target_rate: f64) -> usize {
    if target_rate.is_nan() || target_rate <= 0.0 {
        return 1;
    }
    ((engine_rate / target_rate).floor() as usize).max(1)
}

/// Per-channel sample-and-hold state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleAndHold {
    hold_counter: usize,
    held_sample: f32,
}

impl SampleAndHold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample and get the held output. A new sample is captured at
    /// the start of every run of `factor` samples.
    #[inline]
    pub fn process(&mut self, sample: f32, factor: usize) -> f32 {
        if self.hold_counter == 0 {
            self.held_sample = sample;
        }
        self.hold_counter += 1;
        if self.hold_counter >= factor {
            self.hold_counter = 0;
        }
        self.held_sample
    }

    pub fn reset(&mut self) {
        self.hold_counter = 0;
        self.held_sample = 0.0;
    }

    pub fn hold_counter(&self) -> usize {
        self.hold_counter
    }
}
