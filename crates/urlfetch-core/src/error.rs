//! Per-URL failure taxonomy.
//!
//! Every variant aborts only the task that produced it. The `Display` form is
//! the single line written to the error stream.

use std::path::PathBuf;
use thiserror::Error;

use crate::limiter::LimiterError;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The rate gate refused a permit (context cancelled before grant).
    #[error("rate limiter error: {0}")]
    Limiter(#[from] LimiterError),

    /// The input line is not an absolute request URI.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Curl rejected an option while the request was being assembled.
    #[error("failed to create request: {0}")]
    BuildRequest(#[source] curl::Error),

    /// The URL names a scheme the HTTP transport does not speak.
    #[error("request failed: unsupported protocol scheme \"{0}\"")]
    UnsupportedScheme(String),

    /// DNS, connect, TLS or timeout failure before a complete response head arrived.
    #[error("request failed: {0}")]
    Request(#[source] curl::Error),

    /// The response head arrived but the body transfer broke off.
    #[error("failed to read body: {0}")]
    ReadBody(#[source] curl::Error),

    #[error("failed to create dir: {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create file: {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file contents: {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking transfer or write panicked or was cancelled by the runtime.
    #[error("worker task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(e: tokio::task::JoinError) -> Self {
        FetchError::Task(e.to_string())
    }
}
