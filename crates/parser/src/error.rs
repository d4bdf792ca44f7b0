use alloc::string::String;
use core::fmt::Display;

use crate::analyze::SemanticError;
use crate::lexer::Token;

/// Errors produced while turning source text into a program.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A character the lexer does not understand.
    UnexpectedChar { ch: char, line: usize },
    /// A `/*` comment with no closing `*/`.
    UnterminatedComment { line: usize },
    /// A token that does not fit the grammar at this point.
    UnexpectedToken { expected: &'static str, found: Token, line: usize },
    /// The token stream ended mid-production.
    UnexpectedEof { expected: &'static str },
    /// An integer constant that does not fit `i32` or has a bad radix prefix.
    InvalidConstant { text: String, line: usize },
    /// The program parsed but is not semantically sound.
    Semantic(SemanticError),
    /// An unknown error occurred.
    Other(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnexpectedChar { ch, line } => write!(f, "unexpected character {ch:?} on line {line}"),
            Self::UnterminatedComment { line } => write!(f, "unterminated block comment starting near line {line}"),
            Self::UnexpectedToken { expected, found, line } => {
                write!(f, "expected {expected}, found {found:?} on line {line}")
            }
            Self::UnexpectedEof { expected } => write!(f, "expected {expected}, found end of input"),
            Self::InvalidConstant { text, line } => write!(f, "invalid integer constant `{text}` on line {line}"),
            Self::Semantic(err) => write!(f, "{err}"),
            Self::Other(message) => write!(f, "unknown error: {message}"),
        }
    }
}

impl core::error::Error for ParseError {}

impl From<SemanticError> for ParseError {
    fn from(value: SemanticError) -> Self {
        Self::Semantic(value)
    }
}

/// A wrapper around [`core::result::Result`] for parser operations.
pub type Result<T, E = ParseError> = core::result::Result<T, E>;
