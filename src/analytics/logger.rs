use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::page::controller::RenderOutcome;

// ---------------------------------------------------------------------------
// Render log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the render log (`~/.floorview/render-log.jsonl`).
///
/// One entry per page refresh, whether it rendered or failed. Read back by
/// the reporter for `floorview stats` and `/api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLogEntry {
    pub timestamp: String,
    pub page: String,
    /// Stage the controller ended in: `"idle"` or `"error"`.
    pub stage: String,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub records: usize,
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub facet_options: usize,
    /// Columns displayed records did not carry (rendered empty).
    #[serde(default)]
    pub missing_fields: usize,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RenderLogEntry {
    pub fn from_outcome(outcome: &RenderOutcome) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            page: outcome.page.clone(),
            stage: outcome.stage.label().to_string(),
            success: outcome.success,
            records: outcome.records,
            rows: outcome.rows,
            facet_options: outcome.facet_options,
            missing_fields: outcome.missing_fields,
            duration_ms: outcome.duration_ms,
            error: outcome.error.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a refresh outcome to the render log.
///
/// Best-effort: failures are silently ignored so logging never breaks a render.
pub fn log_render(outcome: &RenderOutcome) {
    let Some(path) = render_log_path() else {
        return;
    };
    let _ = append_entry(&path, &RenderLogEntry::from_outcome(outcome));
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from `~/.floorview/render-log.jsonl`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries() -> Vec<RenderLogEntry> {
    render_log_path()
        .map(|path| read_entries_from(&path))
        .unwrap_or_default()
}

/// Read log entries filtered to a time window (last N days).
///
/// If `days` is `None`, returns all entries.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<RenderLogEntry> {
    filter_since_days(read_all_entries(), days)
}

pub(crate) fn read_entries_from(path: &Path) -> Vec<RenderLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str::<RenderLogEntry>(&line).ok())
        .collect()
}

pub(crate) fn filter_since_days(entries: Vec<RenderLogEntry>, days: Option<u32>) -> Vec<RenderLogEntry> {
    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

pub(crate) fn append_entry(path: &Path, entry: &RenderLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the render log file.
pub fn render_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".floorview").join("render-log.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
