//! Snapshot fetcher.
//!
//! Retrieves a CSV document and parses it into a [`Dataset`]. Remote sources
//! go through the synchronous `ureq` client: one GET per call, no retry, no
//! timeout, no caching. Local paths and `file://` URLs are read from disk so
//! pages can be rendered offline against exported snapshots.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::dataset::{self, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a snapshot could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport failure or non-2xx response.
    #[error("failed to load {source_name}: {message}")]
    NetworkFailure {
        source_name: String,
        message: String,
    },
    /// The body arrived but is not a readable CSV document.
    #[error("failed to parse {source_name}: {message}")]
    ParseFailure {
        source_name: String,
        message: String,
    },
}

impl LoadError {
    fn network(source: &Source, message: impl fmt::Display) -> Self {
        Self::NetworkFailure {
            source_name: source.to_string(),
            message: message.to_string(),
        }
    }

    fn parse(source: &Source, message: impl fmt::Display) -> Self {
        Self::ParseFailure {
            source_name: source.to_string(),
            message: message.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where a snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `http://` or `https://` URL.
    Http(String),
    /// Local file (plain path or `file://` URL).
    File(PathBuf),
    /// Document text already in memory (stdin, tests).
    Inline(String),
}

impl Source {
    /// Interpret a configured location string.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(location.to_string())
        } else if let Some(path) = location.strip_prefix("file://") {
            Self::File(PathBuf::from(path))
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Read the raw document text.
    pub fn read_text(&self) -> Result<String, LoadError> {
        match self {
            Self::Http(url) => {
                let response = ureq::get(url).call().map_err(|e| match e {
                    ureq::Error::Status(code, resp) => {
                        LoadError::network(self, format!("HTTP {code} {}", resp.status_text()))
                    }
                    ureq::Error::Transport(t) => LoadError::network(self, t),
                })?;

                let mut body = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| LoadError::network(self, e))?;

                String::from_utf8(body).map_err(|e| LoadError::parse(self, e))
            }
            Self::File(path) => {
                let body = std::fs::read(path).map_err(|e| LoadError::network(self, e))?;
                String::from_utf8(body).map_err(|e| LoadError::parse(self, e))
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    /// Best-effort reachability probe for `floorview health`.
    ///
    /// Unlike [`fetch_dataset`], this uses a short timeout so the health
    /// report never hangs on a dead host.
    pub fn is_reachable(&self) -> bool {
        match self {
            Self::Http(url) => ureq::head(url)
                .timeout(Duration::from_secs(5))
                .call()
                .is_ok(),
            Self::File(path) => path.is_file(),
            Self::Inline(_) => true,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => write!(f, "<inline>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Fetch and parse a snapshot.
pub fn fetch_dataset(source: &Source) -> Result<Dataset, LoadError> {
    let text = source.read_text()?;
    dataset::parse(&text).map_err(|e| LoadError::parse(source, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
