use serde::Serialize;

/// Precedence of `sin` / `cos`: binds tighter than every binary operator.
pub const FUNCTION_PRECEDENCE: u8 = 6;

/// Binary operators understood by the formula language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Rem, // %
    Shl, // <<
    Shr, // >>
    And, // &
    Xor, // ^
    Or,  // |
}

impl BinaryOp {
    /// Binding strength; higher binds tighter. All operators are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 5,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Shl | BinaryOp::Shr => 3,
            BinaryOp::And => 2,
            BinaryOp::Xor => 1,
            BinaryOp::Or => 0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Or => "|",
        }
    }

    /// Map a single-character operator to its `BinaryOp`. Shifts are two
    /// characters wide and are recognised by the lexer directly.
    pub fn from_char(ch: char) -> Option<BinaryOp> {
        match ch {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '*' => Some(BinaryOp::Mul),
            '/' => Some(BinaryOp::Div),
            '%' => Some(BinaryOp::Rem),
            '&' => Some(BinaryOp::And),
            '^' => Some(BinaryOp::Xor),
            '|' => Some(BinaryOp::Or),
            _ => None,
        }
    }
}

/// Unary functions. Both map the trig range [-1, 1] onto roughly [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Function {
    Sin,
    Cos,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Function> {
        match word {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    // Atoms
    Number(i32),
    Time,  // t
    Input, // x

    // Operators
    Operator(BinaryOp),
    Function(Function),

    // Grouping
    LParen, // (
    RParen, // )

    // Structural
    EOF,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Convert a token back to its source representation.
pub fn token_to_string(token: &Token) -> String {
    match token {
        Token::Number(n) => n.to_string(),
        Token::Time => "t".into(),
        Token::Input => "x".into(),
        Token::Operator(op) => op.symbol().into(),
        Token::Function(f) => f.name().into(),
        Token::LParen => "(".into(),
        Token::RParen => ")".into(),
        Token::EOF => "".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_ladder() {
        assert!(FUNCTION_PRECEDENCE > BinaryOp::Mul.precedence());
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Shl.precedence());
        assert!(BinaryOp::Shl.precedence() > BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() > BinaryOp::Xor.precedence());
        assert!(BinaryOp::Xor.precedence() > BinaryOp::Or.precedence());
        assert_eq!(BinaryOp::Shl.precedence(), BinaryOp::Shr.precedence());
    }

    #[test]
    fn single_char_operators_only() {
        assert_eq!(BinaryOp::from_char('%'), Some(BinaryOp::Rem));
        assert_eq!(BinaryOp::from_char('<'), None);
        assert_eq!(BinaryOp::from_char('~'), None);
    }

    #[test]
    fn token_text() {
        assert_eq!(token_to_string(&Token::Operator(BinaryOp::Shr)), ">>");
        assert_eq!(token_to_string(&Token::Function(Function::Cos)), "cos");
        assert_eq!(token_to_string(&Token::Number(42)), "42");
    }
}
