//! Syntax tree for nug request scripts.
//!
//! Every node records the byte range it was parsed from: `start` is the
//! offset of its first character and `end` is one past its last consumed
//! character, so `&source[node.start..node.end]` recovers its text.
//! Nodes are built once by the parser and never mutated afterwards.

/// Root of a parsed script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Entries in source order.
    pub entries: Vec<Entry>,
    pub start: usize,
    pub end: usize,
}

impl Program {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One request and the response expected for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub request: Request,
    /// Always present; see [`Response::is_present`].
    pub response: Response,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub endpoint: Endpoint,
    /// Header lines in source order, duplicates kept.
    pub headers: Vec<KeyValue>,
    pub start: usize,
    pub end: usize,
}

/// Expected response. All fields are zero when the script wrote none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The protocol marker, `HTTP`.
    pub protocol: String,
    pub status: u16,
    /// Values to capture from the response, in source order.
    pub captures: Vec<KeyValue>,
    pub start: usize,
    pub end: usize,
}

impl Response {
    /// Returns `true` if the script wrote a response section.
    pub fn is_present(&self) -> bool {
        !self.protocol.is_empty()
    }
}

/// The method and URL of a request line. The URL is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub method: String,
    pub url: String,
    pub start: usize,
    pub end: usize,
}

/// A `key: value` line, used for both headers and captures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValue {
    /// Key without its trailing colon.
    pub key: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl KeyValue {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_is_absent() {
        let response = Response::default();
        assert!(!response.is_present());
        assert_eq!(response.status, 0);
        assert!(response.captures.is_empty());
    }

    #[test]
    fn test_program_iteration() {
        let program = Program {
            entries: vec![Entry::default(), Entry::default()],
            start: 0,
            end: 0,
        };
        assert_eq!(program.len(), 2);
        assert_eq!((&program).into_iter().count(), 2);
        assert!(!program.is_empty());
    }
}
