//! Phase 1: Scanner
//!
//! The scanner walks the source one code point at a time and hands out one
//! token per call. It performs:
//! - Whitespace skipping (newlines only advance the line counter)
//! - Comment filtering (`#` as the first character on a line)
//! - Keyword and number classification of whitespace-delimited words
//! - Illegal character detection
//!
//! Offsets are byte offsets into the source; lines are zero-based.

use tracing::trace;

use crate::token::{lookup_word, Token, TokenKind};

/// Pull-based scanner over a borrowed source text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    /// Nothing but whitespace seen since the last newline.
    line_start: bool,
    /// End-of-input was already yielded through the iterator.
    exhausted: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 0,
            line_start: true,
            exhausted: false,
        }
    }

    /// Rewind to the beginning of the source.
    pub fn reset(&mut self) {
        *self = Self::new(self.source);
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Scan the next token. Once the input is exhausted every call returns
    /// an end-of-input token at the same position.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.offset;
        let token = match self.peek_char() {
            None => Token::eof(self.line, start),
            Some(c) if is_illegal(c) => {
                self.bump();
                Token::new(
                    TokenKind::Illegal,
                    &self.source[start..self.offset],
                    self.line,
                    start,
                    self.offset,
                )
            }
            Some(_) => {
                while let Some(c) = self.peek_char() {
                    if c.is_whitespace() || is_illegal(c) {
                        break;
                    }
                    self.bump();
                }
                let word = &self.source[start..self.offset];
                Token::new(lookup_word(word), word, self.line, start, self.offset)
            }
        };

        self.line_start = false;
        trace!(
            kind = %token.kind,
            literal = %token.literal,
            line = token.line,
            start = token.start,
            end = token.end,
            "scanned token"
        );
        token
    }

    /// Skip whitespace and whole-line comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                self.bump();
                self.line += 1;
                self.line_start = true;
            } else if c.is_whitespace() {
                self.bump();
            } else if c == '#' && self.line_start {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    /// Consume up to but not including the newline (or end).
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek_char() {
            self.offset += c.len_utf8();
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    /// Yields every token including a single final end-of-input token.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.exhausted = true;
        }
        Some(token)
    }
}

/// Control characters that are not whitespace cannot appear in a script.
fn is_illegal(c: char) -> bool {
    c.is_control() && !c.is_whitespace()
}
