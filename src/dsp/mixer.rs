//! Mixer: dry/wet blend against a buffered copy of the input.

/// `dry * (1 - mix) + wet * mix`.
#[inline]
pub fn blend(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Holds the dry copy of one block so the wet chain can run in place.
#[derive(Debug, Clone)]
pub struct DryWetMixer {
    buffer: Vec<f32>,
    len: usize,
}

impl DryWetMixer {
    /// Mixer able to hold `max_block` samples without reallocating.
    pub fn new(max_block: usize) -> Self {
        DryWetMixer {
            buffer: vec![0.0; max_block],
            len: 0,
        }
    }

    /// Largest block `capture` accepts.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Copy the dry signal. Anything past `capacity()` is dropped; callers
    /// split longer blocks.
    pub fn capture(&mut self, dry: &[f32]) {
        let n = dry.len().min(self.buffer.len());
        self.buffer[..n].copy_from_slice(&dry[..n]);
        self.len = n;
    }

    /// Blend the captured dry signal into `wet` in place. The same `mix`
    /// applies to the whole block.
    pub fn apply(&self, wet: &mut [f32], mix: f32) {
        let mix = mix.clamp(0.0, 1.0);
        if mix >= 1.0 {
            return;
        }
        for (w, &d) in wet.iter_mut().zip(&self.buffer[..self.len]) {
            *w = blend(d, *w, mix);
        }
    }

    /// The captured dry block.
    pub fn dry(&self) -> &[f32] {
        &self.buffer[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_dry() {
        let mut m = DryWetMixer::new(4);
        let dry = [0.1, -0.2, 0.3, -0.4];
        m.capture(&dry);
        let mut wet = [0.9, 0.9, -0.9, 0.0];
        m.apply(&mut wet, 0.0);
        assert_eq!(wet, dry);
    }

    #[test]
    fn mix_one_is_wet() {
        let mut m = DryWetMixer::new(4);
        m.capture(&[0.1, -0.2, 0.3, -0.4]);
        let mut wet = [0.9, 0.9, -0.9, 0.0];
        m.apply(&mut wet, 1.0);
        assert_eq!(wet, [0.9, 0.9, -0.9, 0.0]);
    }

    #[test]
    fn half_mix_averages() {
        let mut m = DryWetMixer::new(2);
        m.capture(&[1.0, -1.0]);
        let mut wet = [0.0, 0.0];
        m.apply(&mut wet, 0.5);
        assert_eq!(wet, [0.5, -0.5]);
    }

    #[test]
    fn capture_truncates_to_capacity() {
        let mut m = DryWetMixer::new(2);
        m.capture(&[1.0, 2.0, 3.0]);
        assert_eq!(m.dry(), &[1.0, 2.0]);
        assert_eq!(m.len(), 2);
    }
}
