//! Bit shift with hard clip on the quantized code.

pub const MAX_BIT_SHIFT: u32 = 64;

/// Shift `code` left by `shift` bits and clamp to `[-max_val, max_val]`.
/// The shift is done in 128 bits so no supported shift can overflow.
#[inline]
pub fn shift_and_clip(code: i32, shift: u32, max_val: i32) -> i32 {
    let shifted = (code as i128) << shift.min(MAX_BIT_SHIFT);
    let limit = max_val as i128;
    shifted.clamp(-limit, limit) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::quantizer::max_value;

    #[test]
    fn zero_shift_is_identity_inside_range() {
        let max_val = max_value(8);
        for code in -127..=127 {
            assert_eq!(shift_and_clip(code, 0, max_val), code);
        }
    }

    #[test]
    fn shift_multiplies() {
        assert_eq!(shift_and_clip(3, 2, max_value(16)), 12);
        assert_eq!(shift_and_clip(-3, 4, max_value(16)), -48);
    }

    #[test]
    fn large_shift_clamps_exactly() {
        let max_val = max_value(8);
        assert_eq!(shift_and_clip(100, 1, max_val), 127);
        assert_eq!(shift_and_clip(-100, 1, max_val), -127);
        assert_eq!(shift_and_clip(1, 64, max_value(16)), 32767);
        assert_eq!(shift_and_clip(-32767, 64, max_value(16)), -32767);
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(shift_and_clip(0, 64, max_value(16)), 0);
    }

    #[test]
    fn over_range_input_is_clipped_without_shift() {
        assert_eq!(shift_and_clip(130, 0, max_value(8)), 127);
    }
}
