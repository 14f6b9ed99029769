use std::fmt;
use std::ops::Range;

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};

/// A formula that cannot be compiled. Positions are byte offsets into the
/// formula text.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    UnexpectedChar { ch: char, pos: usize },
    InvalidNumber { text: String, pos: usize },
    /// A `)` with no `(` before it.
    MismatchedClose { pos: usize },
    /// A `(` that is never closed.
    MismatchedOpen { pos: usize },
}

impl SyntaxError {
    /// Byte range of the offending text.
    pub fn span(&self) -> Range<usize> {
        match self {
            SyntaxError::UnexpectedChar { ch, pos } => *pos..*pos + ch.len_utf8(),
            SyntaxError::InvalidNumber { text, pos } => *pos..*pos + text.len(),
            SyntaxError::MismatchedClose { pos } | SyntaxError::MismatchedOpen { pos } => {
                *pos..*pos + 1
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SyntaxError::UnexpectedChar { .. } => "not part of the formula language",
            SyntaxError::InvalidNumber { .. } => "does not fit in a 32-bit integer",
            SyntaxError::MismatchedClose { .. } => "no matching '('",
            SyntaxError::MismatchedOpen { .. } => "never closed",
        }
    }

    /// Render a labelled, uncoloured diagnostic pointing into `source`.
    pub fn report(&self, source: &str) -> String {
        let span = self.span();
        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, span.clone())
            .with_config(
                Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(self.to_string())
            .with_label(Label::new(span).with_message(self.label()))
            .finish()
            .write(Source::from(source), &mut out);
        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnexpectedChar { ch, pos } => write!(f, "Invalid char '{ch}' at pos {pos}"),
            SyntaxError::InvalidNumber { text, pos } => write!(f, "Invalid number '{text}' at pos {pos}"),
            SyntaxError::MismatchedClose { pos } => write!(f, "Mismatched ')' at pos {pos}"),
            SyntaxError::MismatchedOpen { pos } => write!(f, "Mismatched brackets: '(' at pos {pos} is never closed"),
        }
    }
}

impl std::error::Error for SyntaxError {}
