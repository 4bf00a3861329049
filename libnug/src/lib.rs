//! Parser for nug request scripts.
//!
//! A nug script is a plain text list of HTTP exchanges. Each entry is a
//! request line with optional headers, optionally followed by the expected
//! response status and values to capture from it:
//!
//! ```text
//! POST https://api.example.com/login
//! content-type: application/json
//! HTTP 200
//! [Capture]
//! token: $.token
//! ```
//!
//! # Parsing Pipeline
//!
//! The parser operates in two phases:
//!
//! 1. **Scanner**: Converts source text into position-tagged tokens on
//!    demand, classifying keywords, numbers and opaque strings.
//!
//! 2. **Parser**: Pulls tokens with one token of lookahead and assembles the
//!    syntax tree, collecting every diagnostic it finds along the way.
//!
//! Executing requests, resolving captures and formatting scripts are left to
//! consumers of the [`Program`] tree.

pub mod ast;
mod error;
mod parser;
mod scanner;
mod token;

pub use ast::{Endpoint, Entry, KeyValue, Program, Request, Response};
pub use error::{Diagnostic, ParseContext, ParseError, Result};
pub use parser::Parser;
pub use scanner::Scanner;
pub use token::{Token, TokenKind};

/// Parse a nug script from a string.
///
/// # Example
///
/// ```
/// use libnug::parse;
///
/// let program = parse("GET https://example.com\nHTTP 200").unwrap();
/// assert_eq!(program.entries[0].response.status, 200);
/// ```
pub fn parse(input: &str) -> Result<Program> {
    parse_with_filename(input, None)
}

/// Parse a nug script from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Program> {
    let ctx = ParseContext::new(filename);
    let mut parser = Parser::with_context(Scanner::new(input), ctx);
    parser.parse_program()
}
