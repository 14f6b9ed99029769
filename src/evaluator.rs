//! Stack evaluator for compiled formulas.
//!
//! Evaluation is total: malformed programs (operand underflow) and programs
//! deeper than the reserved stack produce 0 instead of an error, so the audio
//! callback always finishes in bounded time without allocating.

use crate::program::{Instruction, Program};
use crate::token::{BinaryOp, Function};

/// A reusable evaluation stack. Keep one per audio engine and size it off the
/// audio thread. `run` never grows the stack: a program that would push past
/// the reserved capacity evaluates to 0.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    stack: Vec<i32>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator { stack: Vec::new() }
    }

    /// Evaluator whose stack holds `depth` values.
    pub fn with_capacity(depth: usize) -> Self {
        Evaluator {
            stack: Vec::with_capacity(depth),
        }
    }

    /// Evaluator pre-sized for `program`.
    pub fn for_program(program: &Program) -> Self {
        let mut e = Evaluator::new();
        e.reserve(program);
        e
    }

    /// Make room for `program`'s deepest stack.
    pub fn reserve(&mut self, program: &Program) {
        let needed = program.stack_depth();
        if self.stack.capacity() < needed {
            self.stack.reserve(needed - self.stack.len());
        }
    }

    pub fn capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Run `program` with time `t` and input `x`.
    pub fn run(&mut self, program: &Program, t: u32, x: i32) -> i32 {
        self.stack.clear();
        let stack = &mut self.stack;

        for inst in program.instructions() {
            match *inst {
                Instruction::Number(n) => {
                    if !push_bounded(stack, n) {
                        return 0;
                    }
                }
                Instruction::Time => {
                    if !push_bounded(stack, t as i32) {
                        return 0;
                    }
                }
                Instruction::Input => {
                    if !push_bounded(stack, x) {
                        return 0;
                    }
                }
                Instruction::Function(func) => {
                    let Some(arg) = stack.pop() else {
                        return 0;
                    };
                    stack.push(apply_function(func, arg));
                }
                Instruction::Operator(op) => {
                    let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                        return 0;
                    };
                    stack.push(apply_operator(op, a, b));
                }
            }
        }

        stack.last().copied().unwrap_or(0)
    }
}

/// Push without reallocating; false when the stack is full.
#[inline]
fn push_bounded(stack: &mut Vec<i32>, value: i32) -> bool {
    if stack.len() == stack.capacity() {
        return false;
    }
    stack.push(value);
    true
}

/// One-shot evaluation. Allocates a fresh stack; the audio path uses
/// [`Evaluator::run`] instead.
pub fn evaluate(program: &Program, t: u32, x: i32) -> i32 {
    Evaluator::for_program(program).run(program, t, x)
}

/// `127.5 * (trig(arg) + 1)`, truncated toward zero. Not wrapped to a byte.
fn apply_function(func: Function, arg: i32) -> i32 {
    let v = match func {
        Function::Sin => (arg as f64).sin(),
        Function::Cos => (arg as f64).cos(),
    };
    (127.5 * (v + 1.0)) as i32
}

/// Two's-complement arithmetic throughout. Division and remainder by zero
/// yield 0; shift counts are taken modulo 32.
fn apply_operator(op: BinaryOp, a: i32, b: i32) -> i32 {
    match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                0
            } else {
                a.wrapping_div(b)
            }
        }
        BinaryOp::Rem => {
            if b == 0 {
                0
            } else {
                a.wrapping_rem(b)
            }
        }
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl => a.wrapping_shl(b as u32),
        BinaryOp::Shr => a.wrapping_shr(b as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;

    fn eval(source: &str, t: u32, x: i32) -> i32 {
        evaluate(&compile(source).expect("compile failed"), t, x)
    }

    #[test]
    fn identity_echoes_input() {
        for t in [0, 1, 1000, u32::MAX] {
            assert_eq!(eval("x", t, 77), 77);
        }
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(eval("1+2*3", 9, 9), 7);
        assert_eq!(eval("(1+2)*3", 0, 0), 9);
    }

    #[test]
    fn shift_left_by_time() {
        assert_eq!(eval("t<<2", 5, 0), 20);
        assert_eq!(eval("t<<2", 100, 0), 400);
        assert_eq!(eval("t>>1", 9, 0), 4);
    }

    #[test]
    fn arithmetic_right_shift_keeps_sign() {
        assert_eq!(eval("x>>1", 0, -8), -4);
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(eval("1/0", 0, 0), 0);
        assert_eq!(eval("1%0", 0, 0), 0);
        assert_eq!(eval("t/(x-x)", 42, 3), 0);
    }

    #[test]
    fn bitwise_operators() {
        assert_eq!(eval("12&10", 0, 0), 8);
        assert_eq!(eval("12|3", 0, 0), 15);
        assert_eq!(eval("12^10", 0, 0), 6);
    }

    #[test]
    fn overflow_wraps() {
        assert_eq!(eval("2147483647+1", 0, 0), i32::MIN);
        assert_eq!(eval("t", u32::MAX, 0), -1);
    }

    #[test]
    fn trig_maps_into_byte_range() {
        assert_eq!(eval("sin(0)", 0, 0), 127);
        assert_eq!(eval("cos(0)", 0, 0), 255);
        for t in 0..500 {
            let v = eval("sin(t)", t, 0);
            assert!((0..=255).contains(&v), "sin({t}) gave {v}");
        }
    }

    #[test]
    fn underflow_returns_zero() {
        // `-1` has no unary minus: `1 -` underflows
        assert_eq!(eval("-1", 0, 0), 0);
        assert_eq!(eval("sin()", 0, 0), 0);
        assert_eq!(eval("", 3, 3), 0);
    }

    #[test]
    fn leftover_values_return_top() {
        assert_eq!(eval("1 2", 0, 0), 2);
    }

    #[test]
    fn deterministic() {
        let p = compile("t*(t>>5|t>>8)&x").unwrap();
        let mut e = Evaluator::for_program(&p);
        for t in [0u32, 17, 4096, 123_456] {
            let first = e.run(&p, t, 200);
            assert_eq!(e.run(&p, t, 200), first);
            assert_eq!(evaluate(&p, t, 200), first);
        }
    }

    #[test]
    fn reserve_covers_program_depth() {
        let p = compile("1+(2+(3+(4+5)))").unwrap();
        let mut e = Evaluator::new();
        e.reserve(&p);
        assert!(e.capacity() >= p.stack_depth());
        let cap = e.capacity();
        assert_eq!(e.run(&p, 0, 0), 15);
        assert_eq!(e.capacity(), cap);
    }

    #[test]
    fn program_deeper_than_stack_returns_zero() {
        let p = compile("1+(2+(3+(4+5)))").unwrap();
        let mut e = Evaluator::with_capacity(2);
        let cap = e.capacity();
        assert!(cap < p.stack_depth());
        assert_eq!(e.run(&p, 0, 0), 0);
        assert_eq!(e.capacity(), cap);
    }
}
