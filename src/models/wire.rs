//! Transport-level request and response models.
//!
//! One [`WireRequest`] describes a single exchange handed to a
//! [`Transport`](crate::http::Transport); the transport fills in one
//! [`WireResponse`] from whatever the peer sent back.

use std::collections::HashMap;

use bytes::Bytes;

use crate::utils::{split_header_line, trim_header};

/// HTTP method used by the runtime protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outgoing exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl WireRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: Bytes) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Case-insensitive lookup of an outgoing header.
    #[must_use]
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A response collected from the control endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub content_type: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl WireResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Stores a header, trimming both key and value. Keys are matched
    /// case-insensitively and the last write wins.
    pub fn add_header(&mut self, key: &str, value: &str) {
        self.headers
            .insert(trim_header(key).to_ascii_lowercase(), trim_header(value).to_string());
    }

    /// Parses one raw header line. Lines without a colon are ignored.
    pub fn add_header_line(&mut self, line: &str) {
        if let Some((key, value)) = split_header_line(line) {
            self.add_header(key, value);
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.add_header(key, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.append_body(body.as_ref());
        self
    }

    #[must_use]
    pub fn has_header(&self, key: &str) -> bool {
        self.headers.contains_key(&key.to_ascii_lowercase())
    }

    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Appends a received body chunk. Empty chunks are ignored.
    pub fn append_body(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.body.extend_from_slice(chunk);
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Builds a header map from raw header lines.
#[must_use]
pub fn parse_header_lines<'a, I>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut response = WireResponse::default();
    for line in lines {
        response.add_header_line(line);
    }
    response.headers
}
