//! Compiled formula: a flat postfix instruction stream.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::token::{BinaryOp, Function};

/// One step of a compiled program. Grouping is resolved at compile time, so
/// there is no parenthesis variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Instruction {
    Number(i32),
    Time,
    Input,
    Operator(BinaryOp),
    Function(Function),
}

/// An immutable postfix program. Cloning shares the instruction buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    instructions: Arc<[Instruction]>,
    stack_depth: usize,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let stack_depth = max_stack_depth(&instructions);
        Program {
            instructions: instructions.into(),
            stack_depth,
        }
    }

    /// The pass-through formula `x`.
    pub fn identity() -> Self {
        Program::new(vec![Instruction::Input])
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Largest number of values live on the evaluation stack at once.
    pub fn stack_depth(&self) -> usize {
        self.stack_depth
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl Default for Program {
    fn default() -> Self {
        Program::identity()
    }
}

/// Walk the program the way the evaluator would, stopping where it would
/// abort on underflow.
fn max_stack_depth(instructions: &[Instruction]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for inst in instructions {
        match inst {
            Instruction::Number(_) | Instruction::Time | Instruction::Input => depth += 1,
            Instruction::Function(_) => {
                if depth == 0 {
                    break;
                }
            }
            Instruction::Operator(_) => {
                if depth < 2 {
                    break;
                }
                depth -= 1;
            }
        }
        max = max.max(depth);
    }
    max
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Number(n) => write!(f, "{n}"),
            Instruction::Time => f.write_str("t"),
            Instruction::Input => f.write_str("x"),
            Instruction::Operator(op) => f.write_str(op.symbol()),
            Instruction::Function(func) => f.write_str(func.name()),
        }
    }
}

/// Space-separated postfix form, e.g. `1 2 3 * +`.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, inst) in self.instructions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{inst}")?;
        }
        Ok(())
    }
}
