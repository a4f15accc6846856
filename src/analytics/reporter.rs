//! Render log reporter: aggregation for `floorview stats` and `/api/stats`.

use std::collections::HashMap;

use serde::Serialize;

use crate::analytics::logger::{self, RenderLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics over the render log.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_renders: usize,
    pub failures: usize,
    pub success_pct: f64,
    pub avg_duration_ms: f64,
    pub page_stats: Vec<PageStat>,
    pub daily: Vec<DailyEntry>,
}

/// Per-page aggregated statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PageStat {
    pub page: String,
    pub renders: usize,
    pub failures: usize,
    pub avg_rows: f64,
    pub avg_duration_ms: f64,
    pub missing_fields: usize,
    /// Timestamp of the most recent render.
    pub last_render: String,
    /// Error of the most recent failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Renders per calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyEntry {
    pub date: String,
    pub renders: usize,
    pub failures: usize,
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute stats from the render log, optionally limited to the last `days`.
pub fn compute_stats(days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(days);
    build_stats(&entries)
}

pub fn build_stats(entries: &[RenderLogEntry]) -> Stats {
    let total_renders = entries.len();
    let failures = entries.iter().filter(|e| !e.success).count();

    Stats {
        total_renders,
        failures,
        success_pct: pct(total_renders - failures, total_renders),
        avg_duration_ms: mean(entries.iter().map(|e| e.duration_ms as f64)),
        page_stats: compute_page_stats(entries),
        daily: compute_daily(entries),
    }
}

/// Group by page. Sorted by render count (descending), then page name.
fn compute_page_stats(entries: &[RenderLogEntry]) -> Vec<PageStat> {
    let mut groups: HashMap<&str, Vec<&RenderLogEntry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.page.as_str()).or_default().push(entry);
    }

    let mut stats: Vec<PageStat> = groups
        .into_iter()
        .map(|(page, group)| {
            // Successful renders only; a failed refresh has no rows
            let rendered: Vec<_> = group.iter().filter(|e| e.success).collect();

            PageStat {
                page: page.to_string(),
                renders: group.len(),
                failures: group.len() - rendered.len(),
                avg_rows: mean(rendered.iter().map(|e| e.rows as f64)),
                avg_duration_ms: mean(group.iter().map(|e| e.duration_ms as f64)),
                missing_fields: group.iter().map(|e| e.missing_fields).sum(),
                last_render: group
                    .iter()
                    .map(|e| e.timestamp.as_str())
                    .max()
                    .unwrap_or_default()
                    .to_string(),
                last_error: group
                    .iter()
                    .filter(|e| !e.success)
                    .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
                    .and_then(|e| e.error.clone()),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.renders.cmp(&a.renders).then_with(|| a.page.cmp(&b.page)));
    stats
}

/// Renders grouped by date (the `YYYY-MM-DD` prefix of the RFC 3339 timestamp).
fn compute_daily(entries: &[RenderLogEntry]) -> Vec<DailyEntry> {
    let mut daily: HashMap<&str, DailyEntry> = HashMap::new();
    for entry in entries {
        let date = entry.timestamp.get(..10).unwrap_or("unknown");
        let day = daily.entry(date).or_insert_with(|| DailyEntry {
            date: date.to_string(),
            renders: 0,
            failures: 0,
        });
        day.renders += 1;
        if !entry.success {
            day.failures += 1;
        }
    }

    let mut days: Vec<DailyEntry> = daily.into_values().collect();
    days.sort_by(|a, b| a.date.cmp(&b.date));
    days
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: &str, page: &str, rows: usize, error: Option<&str>) -> RenderLogEntry {
        RenderLogEntry {
            timestamp: timestamp.to_string(),
            page: page.to_string(),
            stage: if error.is_some() { "error" } else { "idle" }.to_string(),
            success: error.is_none(),
            records: rows + 1,
            rows,
            facet_options: 4,
            missing_fields: 1,
            duration_ms: 100,
            error: error.map(str::to_string),
        }
    }

    fn sample_entries() -> Vec<RenderLogEntry> {
        vec![
            entry("2025-01-15T10:00:00+00:00", "wip", 40, None),
            entry("2025-01-15T10:05:00+00:00", "wip", 60, None),
            entry("2025-01-15T10:10:00+00:00", "quality", 0, Some("HTTP 503")),
            entry("2025-01-16T08:00:00+00:00", "wip", 0, Some("timed out")),
        ]
    }

    #[test]
    fn totals_and_success_rate() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.total_renders, 4);
        assert_eq!(stats.failures, 2);
        assert_eq!(stats.success_pct, 50.0);
        assert_eq!(stats.avg_duration_ms, 100.0);
    }

    #[test]
    fn page_stats_group_and_sort() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.page_stats[0].page, "wip");

        let wip = &stats.page_stats[0];
        assert_eq!(wip.renders, 3);
        assert_eq!(wip.failures, 1);
        assert_eq!(wip.avg_rows, 50.0);
        assert_eq!(wip.missing_fields, 3);
        assert_eq!(wip.last_render, "2025-01-16T08:00:00+00:00");
        assert_eq!(wip.last_error.as_deref(), Some("timed out"));
    }

    #[test]
    fn daily_series_is_sorted_by_date() {
        let stats = build_stats(&sample_entries());
        let days: Vec<_> = stats.daily.iter().map(|d| (d.date.as_str(), d.renders, d.failures)).collect();
        assert_eq!(days, [("2025-01-15", 3, 1), ("2025-01-16", 1, 1)]);
    }

    #[test]
    fn empty_log() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_renders, 0);
        assert_eq!(stats.success_pct, 0.0);
        assert!(stats.page_stats.is_empty());
    }
}
