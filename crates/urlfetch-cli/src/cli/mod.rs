//! CLI for urlfetch.

mod fetch;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use urlfetch_core::config::{self, FetchConfig, FileConfig};

/// Reads URLs from stdin, one per line, and fetches each of them.
#[derive(Debug, Parser)]
#[command(name = "urlfetch")]
#[command(about = "Safe URL fetcher for bug bounty hunting", long_about = None)]
pub struct Cli {
    /// Request body.
    #[arg(short = 'b', long, value_name = "DATA")]
    pub body: Option<String>,

    /// Delay between issuing requests, in milliseconds [default: 500].
    #[arg(short = 'd', long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Add a header to every request (repeatable).
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Don't save HTML responses; useful when looking for non-HTML files only.
    #[arg(long)]
    pub ignore_html: bool,

    /// Don't save empty responses.
    #[arg(long)]
    pub ignore_empty: bool,

    /// Use HTTP keep-alive.
    #[arg(short = 'k', long = "keep-alive", visible_alias = "keep-alives")]
    pub keep_alive: bool,

    /// HTTP method to use (POST if a body is given and this is left at GET).
    #[arg(short = 'm', long, default_value = config::DEFAULT_METHOD)]
    pub method: String,

    /// Save responses whose body includes this string.
    #[arg(short = 'M', long = "match", value_name = "STRING")]
    pub match_body: Option<String>,

    /// Directory to save responses in (created as needed) [default: out].
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Save responses with this status code (repeatable).
    #[arg(short = 's', long = "save-status", value_name = "CODE")]
    pub save_status: Vec<String>,

    /// Save all responses.
    #[arg(short = 'S', long = "save")]
    pub save_all: bool,

    /// Send requests through this HTTP proxy.
    #[arg(short = 'x', long, value_name = "PROXY_URL")]
    pub proxy: Option<String>,

    /// Cap on requests in flight at once (default: unbounded).
    #[arg(short = 'c', long, value_name = "N")]
    pub max_in_flight: Option<usize>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let file = config::load_file_config()?;
        let cfg = cli.into_config(file);
        tracing::debug!("effective config: {:?}", cfg);
        fetch::run_fetch(cfg).await
    }

    /// Merges flags over the defaults file. Flags win; repeatable flags
    /// replace the file's list when given at all.
    pub fn into_config(self, file: FileConfig) -> FetchConfig {
        let defaults = FetchConfig::default();

        let headers = if self.headers.is_empty() {
            file.headers.unwrap_or_default()
        } else {
            self.headers
        };

        let save_status = if self.save_status.is_empty() {
            file.save_status.unwrap_or_default()
        } else {
            config::parse_save_status(&self.save_status)
        };

        let delay = self
            .delay
            .or(file.delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.delay);

        FetchConfig {
            method: self.method,
            body: self.body.unwrap_or_default(),
            delay,
            headers,
            match_body: self.match_body.unwrap_or_default(),
            output_dir: self.output.or(file.output_dir).unwrap_or(defaults.output_dir),
            save_status,
            save_all: self.save_all,
            ignore_html: self.ignore_html,
            ignore_empty: self.ignore_empty,
            proxy: self.proxy.or(file.proxy).filter(|p| !p.is_empty()),
            keep_alive: self.keep_alive || file.keep_alive.unwrap_or(false),
            max_in_flight: self.max_in_flight.or(file.max_in_flight),
        }
    }
}

#[cfg(test)]
mod tests;
