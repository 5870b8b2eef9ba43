//! Request Spec: the logical request built for one input line.

use crate::config::{FetchConfig, DEFAULT_METHOD};
use crate::fingerprint;

/// Immutable description of one request. Built per line from the shared
/// configuration; never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Effective method, after POST coercion.
    pub method: String,
    /// The input line exactly as read.
    pub url: String,
    pub body: String,
    /// Raw "Name: Value" lines, malformed ones included (they still count
    /// for the fingerprint and transcript).
    pub headers: Vec<String>,
}

impl RequestSpec {
    pub fn new(cfg: &FetchConfig, raw_url: &str) -> Self {
        Self {
            method: effective_method(&cfg.method, &cfg.body),
            url: raw_url.to_string(),
            body: cfg.body.clone(),
            headers: cfg.headers.clone(),
        }
    }

    pub fn fingerprint(&self) -> String {
        fingerprint::fingerprint(&self.method, &self.url, &self.body, &self.headers)
    }

    /// Headers that parse as `Name: Value`; malformed entries are skipped.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().filter_map(|h| parse_header(h))
    }

    /// Headers as they go on the wire: a repeated name (case-insensitive)
    /// keeps its first position and takes the last value given.
    pub fn effective_headers(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::new();
        for (name, value) in self.header_pairs() {
            match out.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some(slot) => slot.1 = value,
                None => out.push((name, value)),
            }
        }
        out
    }

    /// True if the user supplied a header with this name (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.header_pairs().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// A non-empty body turns the default `GET` into `POST`; any other method is kept.
pub fn effective_method(method: &str, body: &str) -> String {
    if !body.is_empty() && method == DEFAULT_METHOD {
        "POST".to_string()
    } else {
        method.to_string()
    }
}

/// Splits a raw header line at the first `:`. Returns `None` when there is no
/// colon or the name is empty. The value is trimmed.
pub fn parse_header(raw: &str) -> Option<(&str, &str)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}
