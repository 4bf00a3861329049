//! Phase 2: Parser
//!
//! The parser pulls tokens from its scanner with one token of lookahead and
//! builds the syntax tree in a single forward pass. Each grammar construct
//! is driven by its own small state machine:
//!
//! ```text
//! program    := entry+
//! entry      := request response?
//! request    := method url header*
//! response   := 'HTTP' status ('[Capture]' capture*)?
//! header     := key: value
//! capture    := key: value
//! ```
//!
//! Problems are recorded as diagnostics rather than returned immediately, so
//! a single parse can report several of them. Any diagnostic makes the whole
//! parse fail; there is no partial tree.

use std::mem;

use tracing::debug;

use crate::ast::{Endpoint, Entry, KeyValue, Program, Request, Response};
use crate::error::{Diagnostic, ParseContext, ParseError, Result};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestState {
    /// Expecting the method keyword.
    Start,
    /// Method seen, reading the request line.
    Open,
    /// Reading header lines.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Start,
    Method,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseState {
    /// Expecting the protocol marker.
    Start,
    Status,
    /// Optional capture tag.
    Tag,
    Captures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyValueState {
    Key,
    Value,
    Done,
}

/// Token-level parser. Owns its scanner exclusively.
#[derive(Debug)]
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    ctx: ParseContext,
    current: Token,
    peek: Token,
    /// End offset of the most recently consumed token.
    consumed: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self::with_context(scanner, ParseContext::default())
    }

    /// Create a parser whose errors carry the context's filename.
    pub fn with_context(mut scanner: Scanner<'a>, ctx: ParseContext) -> Self {
        // Read two tokens, so current and peek are both set.
        let current = scanner.next_token();
        let peek = scanner.next_token();
        Self {
            scanner,
            ctx,
            current,
            peek,
            consumed: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics recorded so far, in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Parse the whole script. Fails if any diagnostic was recorded or if
    /// the script holds no entries.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut program = Program::default();

        loop {
            if self.current.kind.is_method() {
                let entry = self.parse_entry();
                debug!(
                    method = %entry.request.endpoint.method,
                    url = %entry.request.endpoint.url,
                    headers = entry.request.headers.len(),
                    status = entry.response.status,
                    captures = entry.response.captures.len(),
                    "parsed entry"
                );
                program.entries.push(entry);
            } else if self.current.is(TokenKind::Eof) {
                break;
            } else {
                // Nothing can recover from a stray token between entries.
                self.error("HTTP method");
                break;
            }
        }

        if program.entries.is_empty() {
            let diagnostic = Diagnostic::empty_program(&self.current);
            debug!(%diagnostic, "parse error");
            self.diagnostics.push(diagnostic);
        }

        debug!(
            filename = ?self.ctx.filename,
            entries = program.entries.len(),
            diagnostics = self.diagnostics.len(),
            "parsed program"
        );

        if !self.diagnostics.is_empty() {
            return Err(ParseError::new(&self.ctx, self.diagnostics.clone()));
        }

        if let (Some(first), Some(last)) = (program.entries.first(), program.entries.last()) {
            program.start = first.start;
            program.end = last.end;
        }
        Ok(program)
    }

    fn parse_entry(&mut self) -> Entry {
        let request = self.parse_request();
        let response = self.parse_response();

        let end = if response.is_present() {
            response.end
        } else {
            request.end
        };

        Entry {
            start: request.start,
            end,
            request,
            response,
        }
    }

    fn parse_request(&mut self) -> Request {
        let mut request = Request::default();
        let mut state = RequestState::Start;

        loop {
            match state {
                RequestState::Start => {
                    if !self.current.kind.is_method() {
                        self.error("HTTP method");
                        return Request::default();
                    }
                    request.start = self.current.start;
                    state = RequestState::Open;
                }
                RequestState::Open => {
                    match self.parse_line() {
                        Some(endpoint) => {
                            request.end = endpoint.end;
                            request.endpoint = endpoint;
                        }
                        None => request.end = self.consumed,
                    }
                    state = RequestState::Line;
                }
                RequestState::Line => {
                    // A protocol marker, a fresh method or the end of input
                    // all close the request.
                    if !self.current.is(TokenKind::String) {
                        return request;
                    }
                    if let Some(header) = self.parse_key_value() {
                        request.end = header.end;
                        request.headers.push(header);
                    }
                }
            }
        }
    }

    /// Parse `METHOD URL`, leaving the parser just past the URL.
    fn parse_line(&mut self) -> Option<Endpoint> {
        let mut endpoint = Endpoint::default();
        let mut state = LineState::Start;

        loop {
            match state {
                LineState::Start => {
                    if !self.current.kind.is_method() {
                        self.error("HTTP method");
                        return None;
                    }
                    endpoint.method = self.current.literal.clone();
                    endpoint.start = self.current.start;
                    self.advance();
                    state = LineState::Method;
                }
                LineState::Method => {
                    if !self.current.is(TokenKind::String) {
                        self.error("URL");
                        return None;
                    }
                    endpoint.url = self.current.literal.clone();
                    endpoint.end = self.current.end;
                    self.advance();
                    state = LineState::Done;
                }
                LineState::Done => return Some(endpoint),
            }
        }
    }

    /// Parse the optional response section. A missing protocol marker is
    /// not an error: the entry simply has no expected response.
    fn parse_response(&mut self) -> Response {
        let mut response = Response::default();
        let mut state = ResponseState::Start;

        loop {
            match state {
                ResponseState::Start => {
                    if !self.current.is(TokenKind::Http) {
                        return Response::default();
                    }
                    response.protocol = self.current.literal.clone();
                    response.start = self.current.start;
                    response.end = self.current.end;
                    self.advance();
                    state = ResponseState::Status;
                }
                ResponseState::Status => {
                    if !self.current.is(TokenKind::Number) {
                        self.error("status code");
                        return Response::default();
                    }
                    match self.current.literal.parse::<u16>() {
                        Ok(status) => response.status = status,
                        Err(_) => {
                            self.error("status code");
                            self.advance();
                            return Response::default();
                        }
                    }
                    response.end = self.current.end;
                    self.advance();
                    state = ResponseState::Tag;
                }
                ResponseState::Tag => {
                    if !self.current.is(TokenKind::Capture) {
                        return response;
                    }
                    response.end = self.current.end;
                    self.advance();
                    state = ResponseState::Captures;
                }
                ResponseState::Captures => {
                    if !self.current.is(TokenKind::String) {
                        return response;
                    }
                    if let Some(capture) = self.parse_key_value() {
                        response.end = capture.end;
                        response.captures.push(capture);
                    }
                }
            }
        }
    }

    /// Parse a `key: value` pair. Always consumes at least the key token,
    /// so callers looping over pairs make progress even on bad input.
    fn parse_key_value(&mut self) -> Option<KeyValue> {
        let mut kv = KeyValue::default();
        let mut state = KeyValueState::Key;

        loop {
            match state {
                KeyValueState::Key => {
                    let key = self
                        .current
                        .literal
                        .strip_suffix(':')
                        .filter(|key| !key.is_empty() && self.current.is(TokenKind::String))
                        .map(str::to_string);
                    let Some(key) = key else {
                        self.error("`key:`");
                        self.advance();
                        return None;
                    };
                    kv.key = key;
                    kv.start = self.current.start;
                    self.advance();
                    state = KeyValueState::Value;
                }
                KeyValueState::Value => {
                    let is_value = matches!(self.current.kind, TokenKind::String | TokenKind::Number)
                        && !self.current.literal.ends_with(':');
                    if !is_value {
                        self.error("value");
                        return None;
                    }
                    kv.value = self.current.literal.clone();
                    kv.end = self.current.end;
                    self.advance();
                    state = KeyValueState::Done;
                }
                KeyValueState::Done => return Some(kv),
            }
        }
    }

    /// Move current to the next token and refill the lookahead.
    fn advance(&mut self) {
        self.consumed = self.current.end;
        let next = self.scanner.next_token();
        self.current = mem::replace(&mut self.peek, next);
    }

    /// Record a diagnostic against the current token.
    fn error(&mut self, expected: &'static str) {
        let diagnostic = if self.current.is(TokenKind::Illegal) {
            Diagnostic::lexical(&self.current)
        } else {
            Diagnostic::structural(&self.current, expected)
        };
        debug!(%diagnostic, "parse error");
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(source: &str) -> Parser<'_> {
        Parser::new(Scanner::new(source))
    }

    fn messages(parser: &Parser) -> Vec<String> {
        parser
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_primes_two_tokens() {
        let p = parser("GET https://a.com");
        assert_eq!(p.current.kind, TokenKind::Get);
        assert_eq!(p.peek.kind, TokenKind::String);
    }

    #[test]
    fn test_parse_line() {
        let mut p = parser("POST https://a.com/x?y=1 next");
        let endpoint = p.parse_line().unwrap();
        assert_eq!(endpoint.method, "POST");
        assert_eq!(endpoint.url, "https://a.com/x?y=1");
        assert_eq!((endpoint.start, endpoint.end), (0, 24));
        assert_eq!(p.current.literal, "next");
        assert!(p.diagnostics().is_empty());
    }

    #[test]
    fn test_parse_line_missing_url() {
        let mut p = parser("GET\nHTTP 200");
        assert!(p.parse_line().is_none());
        assert_eq!(messages(&p), vec!["line 2, expected URL, got: HTTP"]);
        // the method was consumed, the marker was not
        assert_eq!(p.current.kind, TokenKind::Http);
    }

    #[test]
    fn test_parse_key_value() {
        let mut p = parser("x-api-version: 2024-06-30");
        let kv = p.parse_key_value().unwrap();
        assert_eq!(kv.key, "x-api-version");
        assert_eq!(kv.value, "2024-06-30");
        assert_eq!((kv.start, kv.end), (0, 25));
        assert!(p.current.is(TokenKind::Eof));
    }

    #[test]
    fn test_parse_key_value_numeric_value() {
        let mut p = parser("retries: 3");
        let kv = p.parse_key_value().unwrap();
        assert_eq!(kv.value, "3");
    }

    #[test]
    fn test_key_without_colon_is_skipped() {
        let mut p = parser("badheader next: one");
        assert!(p.parse_key_value().is_none());
        assert_eq!(messages(&p), vec!["line 1, expected `key:`, got: badheader"]);
        assert_eq!(p.current.literal, "next:");
    }

    #[test]
    fn test_lone_colon_is_not_a_key() {
        let mut p = parser(": value");
        assert!(p.parse_key_value().is_none());
        assert_eq!(messages(&p), vec!["line 1, expected `key:`, got: :"]);
    }

    #[test]
    fn test_missing_value_leaves_next_key() {
        let mut p = parser("empty:\nnext: one");
        assert!(p.parse_key_value().is_none());
        assert_eq!(messages(&p), vec!["line 2, expected value, got: next:"]);
        let kv = p.parse_key_value().unwrap();
        assert_eq!(kv, KeyValue { start: 7, end: 16, ..KeyValue::new("next", "one") });
    }

    #[test]
    fn test_parse_response_absent() {
        let mut p = parser("GET https://b.com");
        let response = p.parse_response();
        assert_eq!(response, Response::default());
        assert!(p.diagnostics().is_empty());
        assert_eq!(p.current.kind, TokenKind::Get);
    }

    #[test]
    fn test_parse_response_with_captures() {
        let source = "HTTP 201\n[Capture]\nid: $.id\ntoken: $.token\nGET x";
        let mut p = parser(source);
        let response = p.parse_response();
        assert_eq!(response.protocol, "HTTP");
        assert_eq!(response.status, 201);
        assert_eq!(
            response.captures.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
            vec!["id", "token"]
        );
        assert_eq!(&source[response.start..response.end], "HTTP 201\n[Capture]\nid: $.id\ntoken: $.token");
        assert_eq!(p.current.kind, TokenKind::Get);
    }

    #[test]
    fn test_parse_response_empty_capture_section() {
        let source = "HTTP 204\n[Capture]\n";
        let mut p = parser(source);
        let response = p.parse_response();
        assert!(response.captures.is_empty());
        assert_eq!(&source[response.start..response.end], "HTTP 204\n[Capture]");
    }

    #[test]
    fn test_parse_response_missing_status() {
        let mut p = parser("HTTP OK");
        assert_eq!(p.parse_response(), Response::default());
        assert_eq!(messages(&p), vec!["line 1, expected status code, got: OK"]);
    }

    #[test]
    fn test_parse_response_status_out_of_range() {
        let mut p = parser("HTTP 99999");
        assert_eq!(p.parse_response(), Response::default());
        assert_eq!(messages(&p), vec!["line 1, expected status code, got: 99999"]);
        assert!(p.current.is(TokenKind::Eof));
    }

    #[test]
    fn test_request_end_follows_last_header() {
        let source = "GET https://a.com\na: 1\nb: 2\nHTTP 200";
        let mut p = parser(source);
        let request = p.parse_request();
        assert_eq!(&source[request.start..request.end], "GET https://a.com\na: 1\nb: 2");
        assert_eq!(request.headers.len(), 2);
        assert_eq!(p.current.kind, TokenKind::Http);
    }

    #[test]
    fn test_illegal_token_is_lexical() {
        let mut p = parser("GET https://a.com\n\u{1}");
        assert!(p.parse_program().is_err());
        assert_eq!(messages(&p), vec!["line 2, illegal character, got: \u{1}"]);
    }

    #[test]
    fn test_trailing_garbage_is_reported() {
        let mut p = parser("GET https://a.com\nHTTP 200\n42");
        let error = p.parse_program().unwrap_err();
        assert_eq!(error.to_string(), "line 3, expected HTTP method, got: 42");
    }

    #[test]
    fn test_empty_program() {
        let mut p = parser("  \n# nothing here\n");
        let error = p.parse_program().unwrap_err();
        assert_eq!(error.to_string(), "line 3, expected a request, got: ");
    }
}
