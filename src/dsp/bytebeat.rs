//! Bytebeat stage: maps audio into the 8-bit formula domain and back, and
//! owns the formula clock `t`.

/// Map a float sample in [-1, 1] to the formula input `x` (roughly 0..=255).
#[inline]
pub fn sample_to_input(sample: f32) -> i32 {
    (sample * 127.5 + 128.0) as i32
}

/// Wrap a formula result to a byte and map it back to [-1, 1].
#[inline]
pub fn output_to_sample(value: i32) -> f32 {
    (value & 0xFF) as f32 / 127.5 - 1.0
}

/// The formula's `t`: advances once per evaluated sample and wraps at
/// `u32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeCounter {
    t: u32,
}

impl TimeCounter {
    pub fn new() -> Self {
        TimeCounter { t: 0 }
    }

    /// Current value of `t`, then advance.
    #[inline]
    pub fn advance(&mut self) -> u32 {
        let t = self.t;
        self.t = self.t.wrapping_add(1);
        t
    }

    pub fn peek(&self) -> u32 {
        self.t
    }

    pub fn reset(&mut self) {
        self.t = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn input_mapping_endpoints() {
        assert_eq!(sample_to_input(-1.0), 0);
        assert_eq!(sample_to_input(0.0), 128);
        assert_eq!(sample_to_input(1.0), 255);
    }

    #[test]
    fn output_wraps_to_byte() {
        assert_abs_diff_eq!(output_to_sample(0), -1.0);
        assert_abs_diff_eq!(output_to_sample(255), 1.0);
        assert_abs_diff_eq!(output_to_sample(256), -1.0);
        assert_abs_diff_eq!(output_to_sample(-1), 1.0);
    }

    #[test]
    fn identity_round_trip_is_close() {
        for i in -100..=100 {
            let s = i as f32 / 100.0;
            let back = output_to_sample(sample_to_input(s));
            assert!((back - s).abs() <= 2.0 / 127.5, "{s} -> {back}");
        }
    }

    #[test]
    fn time_counter_wraps() {
        let mut t = TimeCounter { t: u32::MAX };
        assert_eq!(t.advance(), u32::MAX);
        assert_eq!(t.advance(), 0);
        assert_eq!(t.peek(), 1);
        t.reset();
        assert_eq!(t.advance(), 0);
    }
}
