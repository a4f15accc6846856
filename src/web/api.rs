//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a JSON [`Reply`].

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analytics::{logger, reporter};
use crate::config::{self, FloorviewConfig};
use crate::page::controller::{Controller, RenderOutcome};
use crate::page::PageKind;

use super::Reply;

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Config API response: the effective config plus its TOML rendering.
#[derive(Serialize)]
struct ConfigResponse<'a> {
    config: &'a FloorviewConfig,
    toml_text: String,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    global_config_exists: bool,
    project_config_exists: bool,
    log_enabled: bool,
    log_exists: bool,
    sources: Vec<SourceHealth>,
    pages: Vec<String>,
}

#[derive(Serialize)]
struct SourceHealth {
    name: &'static str,
    location: String,
    reachable: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success reply.
fn json_response<T: Serialize>(data: &T) -> Result<Reply> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Reply::json(200, &body))
}

/// Parse the `?days=N` query parameter from a URL.
fn parse_days_param(url: &str) -> Option<u32> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "days" { v.parse().ok() } else { None }
    })
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/facets/<page>`: facet panes and counts after a fresh refresh.
pub fn get_facets(controller: &Controller, outcome: &RenderOutcome) -> Result<Reply> {
    let mut summary = controller.page().facet_summary();
    summary["outcome"] = serde_json::to_value(outcome).context("failed to serialize outcome")?;
    json_response(&summary)
}

/// `GET /api/stats?days=N`: render log statistics.
pub fn get_stats(url: &str) -> Result<Reply> {
    let stats = reporter::compute_stats(parse_days_param(url));
    json_response(&stats)
}

/// `GET /api/config`: current effective configuration.
pub fn get_config(cfg: &FloorviewConfig) -> Result<Reply> {
    let toml_text = toml::to_string_pretty(cfg).context("failed to serialize config")?;
    json_response(&ConfigResponse {
        config: cfg,
        toml_text,
    })
}

/// `GET /api/health`: config files, sources and render log.
pub fn get_health(cfg: &FloorviewConfig) -> Result<Reply> {
    let exists = |p: Option<std::path::PathBuf>| p.map(|p| p.exists()).unwrap_or(false);

    let sources = [
        ("machines", &cfg.sources.machine_url),
        ("wip", &cfg.sources.wip_url),
        ("work_orders", &cfg.sources.work_order_url),
    ]
    .into_iter()
    .map(|(name, location)| SourceHealth {
        name,
        location: location.clone(),
        reachable: crate::fetch::Source::parse(location).is_reachable(),
    })
    .collect();

    json_response(&HealthResponse {
        global_config_exists: exists(config::global_config_file()),
        project_config_exists: exists(config::project_config_file()),
        log_enabled: cfg.logging.enabled,
        log_exists: exists(logger::render_log_path()),
        sources,
        pages: PageKind::ALL.iter().map(|k| k.path()).collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_days_param_extracts_value() {
        assert_eq!(parse_days_param("/api/stats?days=7"), Some(7));
        assert_eq!(parse_days_param("/api/stats?foo=bar&days=14"), Some(14));
    }

    #[test]
    fn parse_days_param_returns_none_for_missing_or_invalid() {
        assert_eq!(parse_days_param("/api/stats"), None);
        assert_eq!(parse_days_param("/api/stats?foo=bar"), None);
        assert_eq!(parse_days_param("/api/stats?days=abc"), None);
        assert_eq!(parse_days_param("/api/stats?days="), None);
    }

    #[test]
    fn config_response_includes_toml() {
        let reply = get_config(&FloorviewConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(value["config"]["server"]["addr"], "127.0.0.1:9747");
        assert!(value["toml_text"].as_str().unwrap().contains("[sources]"));
    }

    #[test]
    fn health_reports_sources_and_pages() {
        let mut cfg = FloorviewConfig::default();
        cfg.sources.machine_url = "/nonexistent/floorview/machines.csv".to_string();
        cfg.sources.wip_url = "/nonexistent/floorview/wip.csv".to_string();
        cfg.sources.work_order_url = "/nonexistent/floorview/wo.csv".to_string();

        let reply = get_health(&cfg).unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(value["sources"][0]["name"], "machines");
        assert_eq!(value["sources"][0]["reachable"], false);
        assert_eq!(value["pages"].as_array().unwrap().len(), PageKind::ALL.len());
    }
}
