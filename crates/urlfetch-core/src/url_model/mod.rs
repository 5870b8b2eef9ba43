//! URL modeling and artifact directory derivation.
//!
//! Validates input lines as absolute request URIs and maps a URL's host and
//! path onto a directory under the output root.

mod path;

pub use path::{clean_segments, normalize_path, percent_decode};

use std::path::{Path, PathBuf};
use url::{Host, Url};

/// Parses a raw input line as an absolute, hierarchical request URI.
///
/// Returns `None` for relative references and opaque URIs such as `mailto:`.
pub fn parse_request_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw).ok()?;
    if parsed.cannot_be_a_base() {
        return None;
    }
    Some(parsed)
}

/// Host name without port; IPv6 literals lose their brackets.
pub fn hostname(url: &Url) -> String {
    match url.host() {
        Some(Host::Domain(d)) => d.to_string(),
        Some(Host::Ipv4(a)) => a.to_string(),
        Some(Host::Ipv6(a)) => a.to_string(),
        None => String::new(),
    }
}

/// Directory that holds the artifacts for `url`: `<output>/<host>/<normalized path>`.
///
/// The path is percent-decoded, normalized, then cleaned so it can never climb
/// above the host directory.
pub fn artifact_dir(output_dir: &Path, url: &Url) -> PathBuf {
    let mut dir = output_dir.to_path_buf();
    let host = hostname(url);
    if !matches!(host.as_str(), "" | "." | "..") {
        dir.push(host);
    }
    let normalized = normalize_path(&percent_decode(url.path()));
    for segment in clean_segments(&normalized) {
        dir.push(segment);
    }
    dir
}
