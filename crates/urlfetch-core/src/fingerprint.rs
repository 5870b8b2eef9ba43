//! Request fingerprint used as the artifact base name.
//!
//! SHA-1 over `method ‖ raw URL ‖ body ‖ headers joined with ", "`, hex encoded.
//! A naming scheme, not a security boundary: identical requests collide on
//! purpose so a rerun overwrites the previous artifacts.

use sha1::{Digest, Sha1};

/// Canonical header serialization: command-line order, joined with `", "`.
pub fn join_headers(headers: &[String]) -> String {
    headers.join(", ")
}

/// Lowercase hex SHA-1 of the logical request (40 characters).
pub fn fingerprint(method: &str, raw_url: &str, body: &str, headers: &[String]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(method.as_bytes());
    hasher.update(raw_url.as_bytes());
    hasher.update(body.as_bytes());
    hasher.update(join_headers(headers).as_bytes());
    hex::encode(hasher.finalize())
}
