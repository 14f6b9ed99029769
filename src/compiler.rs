//! Formula compiler: operator-precedence (shunting-yard) rewrite of the
//! infix token stream into a postfix `Program`.

use crate::error::SyntaxError;
use crate::lexer::Lexer;
use crate::program::{Instruction, Program};
use crate::token::{BinaryOp, FUNCTION_PRECEDENCE, Function, Spanned, Token};

/// Entries of the working stack. `Group` remembers where its `(` was so an
/// unclosed bracket can be reported.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Group { pos: usize },
    Operator(BinaryOp),
    Function(Function),
}

impl Pending {
    fn precedence(self) -> Option<u8> {
        match self {
            Pending::Group { .. } => None,
            Pending::Operator(op) => Some(op.precedence()),
            Pending::Function(_) => Some(FUNCTION_PRECEDENCE),
        }
    }

    fn instruction(self) -> Option<Instruction> {
        match self {
            Pending::Group { .. } => None,
            Pending::Operator(op) => Some(Instruction::Operator(op)),
            Pending::Function(f) => Some(Instruction::Function(f)),
        }
    }
}

/// Compile formula text into a postfix program.
pub fn compile(source: &str) -> Result<Program, SyntaxError> {
    let tokens = Lexer::new(source).tokenize()?;
    compile_tokens(&tokens)
}

/// Compile an already-lexed token stream.
pub fn compile_tokens(tokens: &[Spanned]) -> Result<Program, SyntaxError> {
    let mut output: Vec<Instruction> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Pending> = Vec::new();

    for spanned in tokens {
        match spanned.token {
            Token::Number(n) => output.push(Instruction::Number(n)),
            Token::Time => output.push(Instruction::Time),
            Token::Input => output.push(Instruction::Input),
            Token::Function(f) => stack.push(Pending::Function(f)),
            Token::Operator(op) => {
                // Left-associative: equal precedence pops too.
                while let Some(prec) = stack.last().and_then(|p| p.precedence()) {
                    if prec < op.precedence() {
                        break;
                    }
                    if let Some(inst) = stack.pop().and_then(Pending::instruction) {
                        output.push(inst);
                    }
                }
                stack.push(Pending::Operator(op));
            }
            Token::LParen => stack.push(Pending::Group {
                pos: spanned.span.start,
            }),
            Token::RParen => {
                loop {
                    match stack.pop() {
                        Some(Pending::Group { .. }) => break,
                        Some(pending) => output.extend(pending.instruction()),
                        None => {
                            return Err(SyntaxError::MismatchedClose {
                                pos: spanned.span.start,
                            });
                        }
                    }
                }
                // `sin(...)` applies as soon as its group closes.
                if let Some(Pending::Function(f)) = stack.last().copied() {
                    stack.pop();
                    output.push(Instruction::Function(f));
                }
            }
            Token::EOF => break,
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Group { pos } => return Err(SyntaxError::MismatchedOpen { pos }),
            other => output.extend(other.instruction()),
        }
    }

    Ok(Program::new(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(source: &str) -> String {
        compile(source).expect("compile failed").to_string()
    }

    #[test]
    fn single_atom() {
        assert_eq!(postfix("x"), "x");
        assert_eq!(postfix("t"), "t");
    }

    #[test]
    fn precedence_respected() {
        assert_eq!(postfix("1+2*3"), "1 2 3 * +");
        assert_eq!(postfix("t*2+1"), "t 2 * 1 +");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(postfix("(1+2)*3"), "1 2 + 3 *");
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        assert_eq!(postfix("8-4-2"), "8 4 - 2 -");
        assert_eq!(postfix("t/2*3"), "t 2 / 3 *");
    }

    #[test]
    fn full_operator_ladder() {
        assert_eq!(postfix("t|t^t&t<<1+2*3"), "t t t t 1 2 3 * + << & ^ |");
    }

    #[test]
    fn classic_bytebeat() {
        assert_eq!(
            postfix("t*(t>>5|t>>8)"),
            "t t 5 >> t 8 >> | *"
        );
    }

    #[test]
    fn function_applies_to_group() {
        assert_eq!(postfix("sin(t)*2"), "t sin 2 *");
        assert_eq!(postfix("cos(t*3)"), "t 3 * cos");
    }

    #[test]
    fn function_binds_tighter_than_operators() {
        assert_eq!(postfix("sin t * 2"), "t sin 2 *");
        assert_eq!(postfix("x + cos t"), "x t cos +");
    }

    #[test]
    fn nested_functions() {
        assert_eq!(postfix("sin(cos(t))"), "t cos sin");
    }

    #[test]
    fn empty_formula_compiles_to_empty_program() {
        let p = compile("   ").unwrap();
        assert!(p.is_empty());
        assert_eq!(p.stack_depth(), 0);
    }

    #[test]
    fn unmatched_close() {
        assert_eq!(compile(")").unwrap_err(), SyntaxError::MismatchedClose { pos: 0 });
        assert_eq!(compile("t+1)").unwrap_err(), SyntaxError::MismatchedClose { pos: 3 });
    }

    #[test]
    fn unclosed_open() {
        assert_eq!(compile("(1").unwrap_err(), SyntaxError::MismatchedOpen { pos: 0 });
        assert_eq!(compile("t*((1)").unwrap_err(), SyntaxError::MismatchedOpen { pos: 2 });
    }

    #[test]
    fn unknown_character() {
        let err = compile("q").unwrap_err();
        assert_eq!(err, SyntaxError::UnexpectedChar { ch: 'q', pos: 0 });
        assert!(err.to_string().contains('q'));
    }

    #[test]
    fn comparison_operators_rejected() {
        assert!(matches!(compile("t>2"), Err(SyntaxError::UnexpectedChar { ch: '>', .. })));
        assert!(matches!(compile("~t"), Err(SyntaxError::UnexpectedChar { ch: '~', .. })));
    }
}
