use crate::error::SyntaxError;
use crate::token::{BinaryOp, Function, Span, Spanned, Token};

pub struct Lexer {
    chars: Vec<char>,
    /// Precomputed byte offset for each char index.
    /// `byte_offsets[i]` = byte offset of `chars[i]` in the original `&str`.
    /// `byte_offsets[chars.len()]` = total byte length (sentinel for EOF).
    byte_offsets: Vec<usize>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut byte_offsets = Vec::with_capacity(chars.len() + 1);
        let mut offset = 0;
        for ch in &chars {
            byte_offsets.push(offset);
            offset += ch.len_utf8();
        }
        byte_offsets.push(offset); // sentinel for EOF
        Lexer {
            chars,
            byte_offsets,
            pos: 0,
        }
    }

    /// Tokenize the whole input. The last token is always `Token::EOF`.
    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let is_eof = spanned.token == Token::EOF;
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_spaces(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos] == ' ' {
            self.pos += 1;
        }
    }

    /// Convert a char index to a byte offset.
    fn byte_pos_of(&self, char_idx: usize) -> usize {
        self.byte_offsets[char_idx.min(self.chars.len())]
    }

    fn spanned(&self, token: Token, start: usize) -> Spanned {
        Spanned {
            token,
            span: Span {
                start: self.byte_pos_of(start),
                end: self.byte_pos_of(self.pos),
            },
        }
    }

    /// `sin` / `cos` at the cursor, checked before any single-char rule.
    fn keyword_at_cursor(&self) -> Option<Function> {
        let end = self.pos + 3;
        if end > self.chars.len() {
            return None;
        }
        let word: String = self.chars[self.pos..end].iter().collect();
        Function::from_keyword(&word)
    }

    fn next_token(&mut self) -> Result<Spanned, SyntaxError> {
        self.skip_spaces();

        if self.pos >= self.chars.len() {
            let end = self.byte_pos_of(self.pos);
            return Ok(Spanned {
                token: Token::EOF,
                span: Span { start: end, end },
            });
        }

        let start = self.pos;

        if let Some(func) = self.keyword_at_cursor() {
            self.pos += 3;
            return Ok(self.spanned(Token::Function(func), start));
        }

        let ch = self.chars[self.pos];
        match ch {
            '<' if self.peek_at(1) == Some('<') => {
                self.pos += 2;
                Ok(self.spanned(Token::Operator(BinaryOp::Shl), start))
            }
            '>' if self.peek_at(1) == Some('>') => {
                self.pos += 2;
                Ok(self.spanned(Token::Operator(BinaryOp::Shr), start))
            }
            '(' => {
                self.pos += 1;
                Ok(self.spanned(Token::LParen, start))
            }
            ')' => {
                self.pos += 1;
                Ok(self.spanned(Token::RParen, start))
            }
            't' => {
                self.pos += 1;
                Ok(self.spanned(Token::Time, start))
            }
            'x' => {
                self.pos += 1;
                Ok(self.spanned(Token::Input, start))
            }
            c if c.is_ascii_digit() => self.lex_number(start),
            c => match BinaryOp::from_char(c) {
                Some(op) => {
                    self.pos += 1;
                    Ok(self.spanned(Token::Operator(op), start))
                }
                None => Err(SyntaxError::UnexpectedChar {
                    ch: c,
                    pos: self.byte_pos_of(start),
                }),
            },
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Spanned, SyntaxError> {
        while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let num: i32 = text.parse().map_err(|_| SyntaxError::InvalidNumber {
            text: text.clone(),
            pos: self.byte_pos_of(start),
        })?;
        Ok(self.spanned(Token::Number(num), start))
    }
}
