//! Token model shared by the scanner and the parser.
//!
//! The scanner resolves all lexical ambiguity up front: keywords, digit runs
//! and opaque strings each get their own kind, and a trailing `:` stays
//! attached to the string it ends. The parser only ever looks at kinds.

use std::fmt;

/// Token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `GET` method keyword.
    Get,
    /// `POST` method keyword.
    Post,
    /// `HTTP` protocol marker opening a response.
    Http,
    /// `[Capture]` section tag.
    Capture,
    /// Any other run of non-whitespace characters (URLs, `key:`, values).
    String,
    /// A run of ASCII digits.
    Number,
    /// End of input.
    Eof,
    /// A character that cannot start any token.
    Illegal,
}

impl TokenKind {
    /// Returns `true` for the request method keywords.
    pub fn is_method(self) -> bool {
        matches!(self, TokenKind::Get | TokenKind::Post)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Get => "GET",
            TokenKind::Post => "POST",
            TokenKind::Http => "HTTP",
            TokenKind::Capture => "CAPTURE",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
        };
        f.write_str(name)
    }
}

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// Zero-based line number.
    pub line: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: &str, line: usize, start: usize, end: usize) -> Self {
        Self {
            kind,
            literal: literal.to_string(),
            line,
            start,
            end,
        }
    }

    /// Build the end-of-input token positioned at `offset`.
    pub(crate) fn eof(line: usize, offset: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, offset, offset)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Classify a complete word: reserved keywords and digit runs win over
/// the generic string category.
pub fn lookup_word(word: &str) -> TokenKind {
    match word {
        "GET" => TokenKind::Get,
        "POST" => TokenKind::Post,
        "HTTP" => TokenKind::Http,
        "[Capture]" => TokenKind::Capture,
        _ if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) => TokenKind::Number,
        _ => TokenKind::String,
    }
}
