//! Run configuration.
//!
//! [`FetchConfig`] is built once before any worker starts and shared read-only
//! behind an `Arc`. [`FileConfig`] holds optional defaults from
//! `~/.config/urlfetch/config.toml`; command-line flags take precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Process-wide fetch configuration. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// HTTP method as given (coercion to POST happens per request).
    pub method: String,
    /// Request body; empty means none.
    pub body: String,
    /// Minimum spacing between rate-limit permits. Zero disables throttling.
    pub delay: Duration,
    /// Raw "Name: Value" header lines in command-line order.
    pub headers: Vec<String>,
    /// Force-save substring; empty means no override.
    pub match_body: String,
    /// Root directory for artifacts.
    pub output_dir: PathBuf,
    /// Status codes that trigger a save.
    pub save_status: Vec<u32>,
    pub save_all: bool,
    pub ignore_html: bool,
    pub ignore_empty: bool,
    /// Upstream HTTP proxy URL, unvalidated.
    pub proxy: Option<String>,
    pub keep_alive: bool,
    /// Optional cap on tasks in flight. `None` = one task per line, unbounded.
    pub max_in_flight: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            method: DEFAULT_METHOD.to_string(),
            body: String::new(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            headers: Vec::new(),
            match_body: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            save_status: Vec::new(),
            save_all: false,
            ignore_html: false,
            ignore_empty: false,
            proxy: None,
            keep_alive: false,
            max_in_flight: None,
        }
    }
}

/// Optional defaults loaded from `config.toml`. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub delay_ms: Option<u64>,
    pub output_dir: Option<PathBuf>,
    /// Used only when no `-H` flag is given.
    pub headers: Option<Vec<String>>,
    pub proxy: Option<String>,
    pub keep_alive: Option<bool>,
    /// Used only when no `-s` flag is given.
    pub save_status: Option<Vec<u32>>,
    pub max_in_flight: Option<usize>,
}

/// Location of the defaults file, if one exists. Never creates it.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlfetch")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load defaults from the XDG config dir; all-defaults when no file exists.
pub fn load_file_config() -> Result<FileConfig> {
    match config_path()? {
        Some(path) => load_from_path(&path),
        None => Ok(FileConfig::default()),
    }
}

/// Parse a defaults file. A malformed file is an error, not a silent default.
pub fn load_from_path(path: &Path) -> Result<FileConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FileConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

/// Parse `--save-status` values. Entries that are not status codes are dropped
/// with a warning instead of failing the run.
pub fn parse_save_status(values: &[String]) -> Vec<u32> {
    values
        .iter()
        .filter_map(|v| match v.trim().parse::<u32>() {
            Ok(code) => Some(code),
            Err(_) => {
                tracing::warn!(value = %v, "ignoring unparsable save-status entry");
                None
            }
        })
        .collect()
}
