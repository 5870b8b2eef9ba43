//! Result and error lines.
//!
//! Each line is emitted with a single `println!`/`eprintln!`, which holds the
//! stream lock for the whole line, so concurrent workers never interleave.

use crate::error::FetchError;
use std::path::PathBuf;
use std::sync::Mutex;

/// What happened to one URL that got a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Artifacts were written; `path` is the body file.
    Saved {
        path: PathBuf,
        url: String,
        status: u32,
    },
    /// The save policy said no.
    Skipped { url: String, status: u32 },
}

impl Outcome {
    pub fn status(&self) -> u32 {
        match self {
            Outcome::Saved { status, .. } | Outcome::Skipped { status, .. } => *status,
        }
    }

    /// The output-stream line: `<path>: <url> <status>` or `<url> <status>`.
    pub fn line(&self) -> String {
        match self {
            Outcome::Saved { path, url, status } => {
                format!("{}: {} {}", path.display(), url, status)
            }
            Outcome::Skipped { url, status } => format!("{url} {status}"),
        }
    }
}

/// Sink for per-URL results. Shared by all workers.
pub trait Reporter: Send + Sync {
    fn outcome(&self, outcome: &Outcome);
    fn failure(&self, error: &FetchError);
}

/// Results to stdout, failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdReporter;

impl Reporter for StdReporter {
    fn outcome(&self, outcome: &Outcome) {
        println!("{}", outcome.line());
    }

    fn failure(&self, error: &FetchError) {
        eprintln!("{error}");
    }
}

/// Keeps lines in memory instead of printing them.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    outcomes: Mutex<Vec<Outcome>>,
    errors: Mutex<Vec<String>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Reporter for CollectingReporter {
    fn outcome(&self, outcome: &Outcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(outcome.clone());
    }

    fn failure(&self, error: &FetchError) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error.to_string());
    }
}
