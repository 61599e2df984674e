//! Best-effort SQL tokenizer.
//!
//! The tokenizer is a character state machine that never fails: malformed
//! input is absorbed and whatever is pending at end of input is flushed as
//! a final token. It does not distinguish keywords from identifiers — that
//! separation belongs to the tree builder, which compares token text
//! case-insensitively where it matters.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::token::{Position, Token, TokenKind};

/// Characters that always form single-character punctuation tokens.
const PUNCTUATION_CHARS: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';'];

/// Default operator alphabet; contiguous runs form one operator token.
const OPERATOR_CHARS: &[char] = &[
    ':', '+', '-', '*', '/', '=', '<', '>', '!', '|', '&', '~', '@', '%', '^', '?', '.',
];

static DECIMAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap());
static BINARY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0b[01]+$").unwrap());
static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").unwrap());

/// Tokenizer configuration.
///
/// `extra_identifier_chars` extends the identifier alphabet for dialects
/// that allow characters like `$` or `#` in names. A character added here
/// is removed from the operator alphabet so the two classes stay disjoint.
#[derive(Debug, Clone, Default)]
pub struct TokenizerOptions {
    pub extra_identifier_chars: Vec<char>,
}

/// Character-level SQL tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    options: TokenizerOptions,
}

/// Tokenize with default options.
pub fn tokenize(sql: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(sql)
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Self { options }
    }

    /// Produce the ordered token sequence for `sql`.
    ///
    /// Whitespace is discarded; everything else, including comments, is
    /// kept. Offsets in the returned positions count characters.
    pub fn tokenize(&self, sql: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(&self.options);
        scanner.run(sql);
        debug!(
            chars = sql.chars().count(),
            tokens = scanner.tokens.len(),
            "tokenized input"
        );
        scanner.tokens
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    LineComment,
    BlockComment,
    InString(char),
}

/// Position of the next unread character.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: usize,
    column: usize,
}

struct Scanner<'o> {
    options: &'o TokenizerOptions,
    tokens: Vec<Token>,
    state: State,
    buffer: String,
    start: Cursor,
    cursor: Cursor,
}

impl<'o> Scanner<'o> {
    fn new(options: &'o TokenizerOptions) -> Self {
        let origin = Cursor {
            offset: 0,
            line: 1,
            column: 1,
        };
        Self {
            options,
            tokens: Vec::new(),
            state: State::Normal,
            buffer: String::new(),
            start: origin,
            cursor: origin,
        }
    }

    fn run(&mut self, sql: &str) {
        let chars: Vec<char> = sql.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match self.state {
                State::BlockComment => {
                    self.buffer.push(c);
                    self.advance(c);
                    if c == '*' && next == Some('/') {
                        self.buffer.push('/');
                        self.advance('/');
                        self.flush_as(TokenKind::Comment);
                        self.state = State::Normal;
                        i += 1;
                    }
                    i += 1;
                }
                State::LineComment => {
                    self.buffer.push(c);
                    self.advance(c);
                    if c == '\n' {
                        self.flush_as(TokenKind::Comment);
                        self.state = State::Normal;
                    }
                    i += 1;
                }
                State::InString(quote) => {
                    if c == quote && next == Some(quote) {
                        // Doubled delimiter is an escaped delimiter.
                        self.buffer.push(c);
                        self.buffer.push(quote);
                        self.advance(c);
                        self.advance(quote);
                        i += 2;
                    } else if c == quote {
                        self.buffer.push(c);
                        self.advance(c);
                        self.flush_as(string_kind(quote));
                        self.state = State::Normal;
                        i += 1;
                    } else {
                        self.buffer.push(c);
                        self.advance(c);
                        i += 1;
                    }
                }
                State::Normal => {
                    i += self.scan_normal(c, next);
                }
            }
        }

        // Flush whatever the final state left pending.
        match self.state {
            State::Normal => self.flush_pending(),
            State::LineComment | State::BlockComment => self.flush_as(TokenKind::Comment),
            State::InString(quote) => self.flush_as(string_kind(quote)),
        }
    }

    /// One step of the normal state; returns how many characters were consumed.
    fn scan_normal(&mut self, c: char, next: Option<char>) -> usize {
        if c == '/' && next == Some('*') {
            self.flush_pending();
            self.begin();
            self.buffer.push('/');
            self.buffer.push('*');
            self.advance('/');
            self.advance('*');
            self.state = State::BlockComment;
            return 2;
        }

        if c == '-' && next == Some('-') {
            self.flush_pending();
            self.begin();
            self.buffer.push('-');
            self.buffer.push('-');
            self.advance('-');
            self.advance('-');
            self.state = State::LineComment;
            return 2;
        }

        if c == '\'' || c == '"' || c == '`' {
            self.flush_pending();
            self.begin();
            self.buffer.push(c);
            self.advance(c);
            self.state = State::InString(c);
            return 1;
        }

        if self.is_operator_char(c) {
            // A word run ends where an operator run begins.
            if !self.buffer.is_empty() && !self.buffer_is_operator_run() {
                self.flush_pending();
            }
            if self.buffer.is_empty() {
                self.begin();
            }
            self.buffer.push(c);
            self.advance(c);
            return 1;
        }

        // An operator run ends at the first non-operator character.
        if self.buffer_starts_operator() {
            self.flush_pending();
        }

        if PUNCTUATION_CHARS.contains(&c) {
            self.flush_pending();
            self.begin();
            self.buffer.push(c);
            self.advance(c);
            self.flush_as(TokenKind::Punctuation);
            return 1;
        }

        if c.is_whitespace() {
            self.flush_pending();
            self.advance(c);
            return 1;
        }

        if self.buffer.is_empty() {
            self.begin();
        }
        self.buffer.push(c);
        self.advance(c);
        1
    }

    #[inline]
    fn advance(&mut self, c: char) {
        self.cursor.offset += 1;
        if c == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
    }

    /// Mark the current cursor as the start of the next token.
    #[inline]
    fn begin(&mut self) {
        self.start = self.cursor;
    }

    fn flush_pending(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let kind = self.classify(&self.buffer);
        self.flush_as(kind);
    }

    fn flush_as(&mut self, kind: TokenKind) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        self.tokens.push(Token {
            kind,
            text,
            position: Position {
                start_offset: self.start.offset,
                end_offset: self.cursor.offset,
                start_line: self.start.line,
                end_line: self.cursor.line,
                start_column: self.start.column,
                end_column: self.cursor.column,
            },
        });
    }

    /// Classify an accumulated buffer at a token boundary.
    fn classify(&self, text: &str) -> TokenKind {
        if self.is_identifier(text) {
            return TokenKind::Word;
        }
        if DECIMAL_PATTERN.is_match(text)
            || BINARY_PATTERN.is_match(text)
            || HEX_PATTERN.is_match(text)
        {
            return TokenKind::Number;
        }
        if delimited_by(text, '\'') || delimited_by(text, '`') {
            return TokenKind::String;
        }
        if delimited_by(text, '"') {
            // Quoted identifier; the quotes stay in the text.
            return TokenKind::Word;
        }
        if text.chars().all(|c| self.is_operator_char(c)) {
            return TokenKind::Operator;
        }
        TokenKind::Word
    }

    fn is_identifier(&self, text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || self.is_extra(c) => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || self.is_extra(c))
    }

    #[inline]
    fn is_extra(&self, c: char) -> bool {
        self.options.extra_identifier_chars.contains(&c)
    }

    #[inline]
    fn is_operator_char(&self, c: char) -> bool {
        OPERATOR_CHARS.contains(&c) && !self.is_extra(c)
    }

    fn buffer_is_operator_run(&self) -> bool {
        self.buffer
            .chars()
            .next_back()
            .is_some_and(|c| self.is_operator_char(c))
    }

    fn buffer_starts_operator(&self) -> bool {
        self.buffer
            .chars()
            .next()
            .is_some_and(|c| self.is_operator_char(c))
    }
}

#[inline]
fn string_kind(quote: char) -> TokenKind {
    // Double-quoted content keeps quoted-identifier semantics.
    if quote == '"' {
        TokenKind::Word
    } else {
        TokenKind::String
    }
}

fn delimited_by(text: &str, quote: char) -> bool {
    let mut chars = text.chars();
    text.chars().count() >= 2 && chars.next() == Some(quote) && chars.next_back() == Some(quote)
}
