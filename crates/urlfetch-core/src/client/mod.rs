//! HTTP client factory.
//!
//! Uses the curl crate (libcurl). One [`HttpClient`] is shared by every
//! worker; each request runs on its own `Easy` handle. With keep-alive on,
//! finished handles (and the connection each one caches) go back to a small
//! idle pool for reuse. Redirects are never followed.
//!
//! Transfers block the calling thread; call from `spawn_blocking` in async code.

mod response;

pub use response::ResponseRecord;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::request::RequestSpec;
use curl::easy::{Easy, List};
use response::HeadCollector;
use std::sync::Mutex;
use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const IDLE_CONN_TIMEOUT: Duration = Duration::from_secs(1);
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(1);
pub const MAX_IDLE_CONNS: usize = 30;

/// Schemes handed to libcurl; anything else never reaches a transfer.
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// Transport settings taken from the run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub keep_alive: bool,
    pub proxy: Option<String>,
}

impl ClientOptions {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self {
            keep_alive: cfg.keep_alive,
            proxy: cfg.proxy.clone(),
        }
    }
}

/// Shared, thread-safe HTTP client.
pub struct HttpClient {
    keep_alive: bool,
    proxy: Option<String>,
    idle: Mutex<Vec<Easy>>,
}

impl HttpClient {
    /// Builds the client. A proxy URL that does not parse is dropped with a
    /// warning and the client connects directly.
    pub fn new(opts: ClientOptions) -> Self {
        let proxy = opts.proxy.filter(|p| !p.is_empty()).and_then(|p| {
            match url::Url::parse(&p) {
                Ok(_) => Some(p),
                Err(e) => {
                    tracing::warn!(proxy = %p, "ignoring unparsable proxy URL: {}", e);
                    None
                }
            }
        });
        Self {
            keep_alive: opts.keep_alive,
            proxy,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Number of pooled handles waiting for reuse.
    pub fn idle_handles(&self) -> usize {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Performs one request and buffers the whole response.
    ///
    /// Returns the first response received, 3xx included. URLs with a scheme
    /// other than http or https fail before any handle is touched.
    pub fn execute(&self, req: &RequestSpec) -> Result<ResponseRecord, FetchError> {
        check_scheme(&req.url)?;
        let mut easy = self.checkout();
        let result = self.perform(&mut easy, req);
        if result.is_ok() {
            self.checkin(easy);
        }
        result
    }

    fn checkout(&self) -> Easy {
        if self.keep_alive {
            let pooled = self.idle.lock().unwrap_or_else(|e| e.into_inner()).pop();
            if let Some(mut easy) = pooled {
                // Clears options but keeps the handle's connection cache.
                easy.reset();
                return easy;
            }
        }
        Easy::new()
    }

    fn checkin(&self, easy: Easy) {
        if !self.keep_alive {
            return;
        }
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < MAX_IDLE_CONNS {
            idle.push(easy);
        }
    }

    fn configure(&self, easy: &mut Easy, req: &RequestSpec) -> Result<(), curl::Error> {
        easy.url(&req.url)?;
        easy.follow_location(false)?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;
        easy.timeout(REQUEST_TIMEOUT)?;
        easy.ssl_verify_peer(true)?;
        easy.ssl_verify_host(true)?;
        easy.tcp_keepalive(true)?;
        easy.tcp_keepidle(TCP_KEEPALIVE)?;
        easy.tcp_keepintvl(TCP_KEEPALIVE)?;

        if self.keep_alive {
            easy.maxage_conn(IDLE_CONN_TIMEOUT)?;
        } else {
            easy.forbid_reuse(true)?;
        }

        // An empty proxy string also stops libcurl from reading *_proxy env vars.
        easy.proxy(self.proxy.as_deref().unwrap_or(""))?;

        let method = req.method.as_str();
        if !req.body.is_empty() {
            easy.post(true)?;
            easy.post_fields_copy(req.body.as_bytes())?;
            if method != "POST" {
                easy.custom_request(method)?;
            }
        } else if method.eq_ignore_ascii_case("HEAD") {
            easy.nobody(true)?;
        } else if method != "GET" {
            easy.custom_request(method)?;
        }

        easy.http_headers(self.header_list(req)?)?;
        Ok(())
    }

    fn header_list(&self, req: &RequestSpec) -> Result<List, curl::Error> {
        let mut list = List::new();
        for (name, value) in req.effective_headers() {
            if value.is_empty() {
                // "Name;" is libcurl's syntax for a header with an empty value.
                list.append(&format!("{name};"))?;
            } else {
                list.append(&format!("{name}: {value}"))?;
            }
        }
        if !self.keep_alive && !req.has_header("Connection") {
            list.append("Connection: close")?;
        }
        if !req.body.is_empty() {
            // Suppress headers libcurl would add on its own for a POST body.
            if !req.has_header("Content-Type") {
                list.append("Content-Type:")?;
            }
            if !req.has_header("Expect") {
                list.append("Expect:")?;
            }
        }
        Ok(list)
    }

    fn perform(&self, easy: &mut Easy, req: &RequestSpec) -> Result<ResponseRecord, FetchError> {
        self.configure(easy, req).map_err(FetchError::BuildRequest)?;

        let mut head = HeadCollector::default();
        let mut body = Vec::new();
        let outcome = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    head.push_line(data);
                    true
                })
                .map_err(FetchError::BuildRequest)?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(FetchError::BuildRequest)?;
            transfer.perform()
        };

        if let Err(e) = outcome {
            if head.is_complete() && !is_connect_phase(&e) {
                return Err(FetchError::ReadBody(e));
            }
            return Err(FetchError::Request(e));
        }

        let status = easy.response_code().map_err(FetchError::Request)?;
        Ok(head.into_record(status, body))
    }
}

fn check_scheme(raw_url: &str) -> Result<(), FetchError> {
    let scheme = match url::Url::parse(raw_url) {
        Ok(u) => u.scheme().to_string(),
        Err(_) => raw_url
            .split_once(':')
            .map(|(s, _)| s.to_ascii_lowercase())
            .unwrap_or_default(),
    };
    if SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
        Ok(())
    } else {
        Err(FetchError::UnsupportedScheme(scheme))
    }
}

/// Errors that can only happen before a response exists (a proxy CONNECT
/// reply may already have been seen).
fn is_connect_phase(e: &curl::Error) -> bool {
    e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_couldnt_connect()
        || e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
}
