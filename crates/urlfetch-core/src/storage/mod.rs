//! Artifact persistence.
//!
//! A saved response becomes an Artifact Pair: `<fingerprint>.body` holds the
//! raw response body and `<fingerprint>.headers` a request/response transcript.
//! Both live in the same directory. Writes overwrite (last writer wins).

mod transcript;

pub use transcript::render_transcript;

use crate::client::ResponseRecord;
use crate::error::FetchError;
use crate::request::RequestSpec;
use crate::url_model;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use url::Url;

pub const BODY_EXT: &str = "body";
pub const HEADERS_EXT: &str = "headers";
/// rwxr-x---
pub const DIR_MODE: u32 = 0o750;
/// rw-r--r--
pub const FILE_MODE: u32 = 0o644;

/// The two sibling files written for one saved response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub body: PathBuf,
    pub headers: PathBuf,
}

impl ArtifactPair {
    pub fn new(dir: &Path, fingerprint: &str) -> Self {
        Self {
            body: dir.join(format!("{fingerprint}.{BODY_EXT}")),
            headers: dir.join(format!("{fingerprint}.{HEADERS_EXT}")),
        }
    }

    /// Paths for `spec` under `output_dir`, using the already-parsed URL for
    /// host and path.
    pub fn for_request(output_dir: &Path, url: &Url, spec: &RequestSpec) -> Self {
        Self::new(&url_model::artifact_dir(output_dir, url), &spec.fingerprint())
    }

    pub fn dir(&self) -> &Path {
        self.body.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Creates the directory and writes both files. Stops at the first failure;
/// whatever was written before it stays on disk.
pub fn persist(
    pair: &ArtifactPair,
    spec: &RequestSpec,
    response: &ResponseRecord,
) -> Result<(), FetchError> {
    create_dir(pair.dir())?;

    let mut body_file = create_file(&pair.body)?;
    body_file
        .write_all(&response.body)
        .map_err(|source| FetchError::WriteFile {
            path: pair.body.clone(),
            source,
        })?;

    let mut headers_file = create_file(&pair.headers)?;
    headers_file
        .write_all(render_transcript(spec, response).as_bytes())
        .map_err(|source| FetchError::WriteFile {
            path: pair.headers.clone(),
            source,
        })?;

    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), FetchError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(dir).map_err(|source| FetchError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn create_file(path: &Path) -> Result<fs::File, FetchError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);
    options.open(path).map_err(|source| FetchError::CreateFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(url: &str) -> RequestSpec {
        RequestSpec {
            method: "GET".to_string(),
            url: url.to_string(),
            body: String::new(),
            headers: vec!["X-Test: 1".to_string()],
        }
    }

    fn response(body: &[u8]) -> ResponseRecord {
        ResponseRecord {
            status: 200,
            proto: "HTTP/1.1".to_string(),
            status_text: "200 OK".to_string(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: body.to_vec(),
        }
    }

    #[test]
    fn pair_paths_are_siblings() {
        let url = Url::parse("http://example.test/a/b").unwrap();
        let s = spec("http://example.test/a/b");
        let pair = ArtifactPair::for_request(Path::new("out"), &url, &s);
        let fp = s.fingerprint();
        assert_eq!(pair.body, PathBuf::from(format!("out/example.test/a/b/{fp}.body")));
        assert_eq!(pair.headers, PathBuf::from(format!("out/example.test/a/b/{fp}.headers")));
        assert_eq!(pair.body.parent(), pair.headers.parent());
        assert_eq!(pair.dir(), Path::new("out/example.test/a/b"));
    }

    #[test]
    fn persist_writes_both_files() {
        let out = tempfile::tempdir().unwrap();
        let url = Url::parse("http://example.test/a").unwrap();
        let s = spec("http://example.test/a");
        let pair = ArtifactPair::for_request(out.path(), &url, &s);
        persist(&pair, &s, &response(b"hello")).unwrap();

        assert_eq!(fs::read(&pair.body).unwrap(), b"hello");
        let transcript = fs::read_to_string(&pair.headers).unwrap();
        assert!(transcript.starts_with("GET http://example.test/a\n\n> X-Test: 1\n"));
        assert!(transcript.ends_with("< Content-Type: text/plain\n"));
    }

    #[test]
    fn persist_overwrites() {
        let out = tempfile::tempdir().unwrap();
        let url = Url::parse("http://example.test/a").unwrap();
        let s = spec("http://example.test/a");
        let pair = ArtifactPair::for_request(out.path(), &url, &s);
        persist(&pair, &s, &response(b"first, longer body")).unwrap();
        persist(&pair, &s, &response(b"second")).unwrap();
        assert_eq!(fs::read(&pair.body).unwrap(), b"second");
    }

    #[cfg(unix)]
    #[test]
    fn persist_sets_modes() {
        use std::os::unix::fs::PermissionsExt;

        let out = tempfile::tempdir().unwrap();
        let url = Url::parse("http://example.test/deep/dir").unwrap();
        let s = spec("http://example.test/deep/dir");
        let pair = ArtifactPair::for_request(out.path(), &url, &s);
        persist(&pair, &s, &response(b"x")).unwrap();

        // The process umask can only remove bits.
        let dir_mode = fs::metadata(pair.dir()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode & !DIR_MODE, 0);
        let file_mode = fs::metadata(&pair.body).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode & !FILE_MODE, 0);
    }

    #[test]
    fn persist_reports_dir_failure() {
        let out = tempfile::tempdir().unwrap();
        let blocker = out.path().join("example.test");
        fs::write(&blocker, b"a file where a directory should go").unwrap();
        let url = Url::parse("http://example.test/a").unwrap();
        let s = spec("http://example.test/a");
        let pair = ArtifactPair::for_request(out.path(), &url, &s);
        let err = persist(&pair, &s, &response(b"x")).unwrap_err();
        assert!(matches!(err, FetchError::CreateDir { .. }));
        assert!(err.to_string().starts_with("failed to create dir: "));
    }
}
