//! Response Record and assembly from raw header lines.

/// One final HTTP response, read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub status: u32,
    /// Protocol token of the status line, e.g. `HTTP/1.1`.
    pub proto: String,
    /// Status line after the protocol, e.g. `200 OK`.
    pub status_text: String,
    /// Response headers in wire order; repeated names are kept.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Accumulates header lines as curl delivers them. A new status line starts
/// over, so interim `1xx` responses and proxy CONNECT replies are discarded.
#[derive(Debug, Default)]
pub(crate) struct HeadCollector {
    status_line: Option<String>,
    headers: Vec<(String, String)>,
    complete: bool,
}

impl HeadCollector {
    pub(crate) fn push_line(&mut self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim_end_matches(['\r', '\n']);

        if line.starts_with("HTTP/") {
            self.status_line = Some(line.to_string());
            self.headers.clear();
            self.complete = false;
            return;
        }

        if line.is_empty() {
            if let Some(status_line) = &self.status_line {
                self.complete = !is_interim(status_line);
            }
            return;
        }

        if let Some((name, value)) = line.split_once(':') {
            self.headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    /// True once the head of a final (non-1xx) response has been received.
    pub(crate) fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn into_record(self, status: u32, body: Vec<u8>) -> ResponseRecord {
        let status_line = self.status_line.unwrap_or_default();
        let (proto, mut status_text) = match status_line.split_once(' ') {
            Some((proto, rest)) => (proto.to_string(), rest.trim().to_string()),
            None => (status_line.clone(), status.to_string()),
        };
        // HTTP/2 and later send no reason phrase.
        if !status_text.contains(' ') {
            if let Some(reason) = canonical_reason(status) {
                status_text = format!("{status} {reason}");
            }
        }
        ResponseRecord {
            status,
            proto,
            status_text,
            headers: self.headers,
            body,
        }
    }
}

fn canonical_reason(status: u32) -> Option<&'static str> {
    let code = u16::try_from(status).ok()?;
    http::StatusCode::from_u16(code).ok()?.canonical_reason()
}

fn is_interim(status_line: &str) -> bool {
    status_line
        .split_whitespace()
        .nth(1)
        .map_or(false, |code| code.starts_with('1'))
}
