//! Token and position types produced by the tokenizer.

use std::fmt;

/// A range of source positions occupied by one token.
///
/// Offsets count characters (not bytes) from the start of the input;
/// `end_offset` is exclusive, one past the token's last character. Lines
/// and columns are 1-based, and `end_line`/`end_column` locate the
/// position immediately after the last character. The analyzer resolves
/// nodes purely by offset containment, so these must be exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl Position {
    /// Whether a character offset falls inside this range.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_offset && offset < self.end_offset
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.start_line, self.start_column)
    }
}

/// Lexical class of a token.
///
/// `Word` covers keywords and identifiers alike: the tokenizer does not
/// distinguish them, classification is purely lexical. Quoted identifiers
/// (`"name"`) are also `Word`, with the quotes preserved in the text so
/// case-sensitive comparison stays possible downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    String,
    Number,
    Operator,
    Punctuation,
    Comment,
}

/// One lexed token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    /// Case-insensitive keyword comparison against the raw token text.
    #[inline]
    pub fn matches(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }

    /// Whether the token is a `Word` matching `keyword` case-insensitively.
    #[inline]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.matches(keyword)
    }
}
