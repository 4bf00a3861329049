//! Error types for nug parsing.

use thiserror::Error;

use crate::token::Token;

/// Result type for nug parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }
}

/// A single problem found while parsing. The rendered form,
/// `line <n>, <message>, got: <literal>`, is stable and safe for tooling
/// to match on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Input that no token category accepts.
    #[error("line {line}, illegal character, got: {literal}")]
    Lexical { line: usize, literal: String },

    /// A required token was missing at a grammar position.
    #[error("line {line}, expected {expected}, got: {literal}")]
    Structural {
        line: usize,
        expected: &'static str,
        literal: String,
    },

    /// The script did not contain a single entry.
    #[error("line {line}, expected a request, got: {literal}")]
    EmptyProgram { line: usize, literal: String },
}

impl Diagnostic {
    pub(crate) fn lexical(token: &Token) -> Self {
        Diagnostic::Lexical {
            line: token.line + 1,
            literal: token.literal.clone(),
        }
    }

    pub(crate) fn structural(token: &Token, expected: &'static str) -> Self {
        Diagnostic::Structural {
            line: token.line + 1,
            expected,
            literal: token.literal.clone(),
        }
    }

    pub(crate) fn empty_program(token: &Token) -> Self {
        Diagnostic::EmptyProgram {
            line: token.line + 1,
            literal: token.literal.clone(),
        }
    }

    /// One-based source line.
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::Lexical { line, .. }
            | Diagnostic::Structural { line, .. }
            | Diagnostic::EmptyProgram { line, .. } => *line,
        }
    }

    /// The offending token text.
    pub fn literal(&self) -> &str {
        match self {
            Diagnostic::Lexical { literal, .. }
            | Diagnostic::Structural { literal, .. }
            | Diagnostic::EmptyProgram { literal, .. } => literal,
        }
    }
}

/// Error type for nug parsing: every diagnostic recorded during the parse,
/// in the order they were found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(.filename, .diagnostics))]
pub struct ParseError {
    pub filename: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(ctx: &ParseContext, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            filename: ctx.filename.clone(),
            diagnostics,
        }
    }

    /// Individual diagnostic messages.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }
}

fn render(filename: &Option<String>, diagnostics: &[Diagnostic]) -> String {
    let joined = diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match filename {
        Some(name) => format!("{}: {}", name, joined),
        None => joined,
    }
}
