//! Embedded web dashboard for floorview.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The rendered dashboard pages; every page request is a refresh
//! - JSON API endpoints for facets, render stats, health and config
//!
//! Launched via `floorview serve` (default: `http://127.0.0.1:9747`).
//! Requests are handled one at a time, so two refreshes of the same page can
//! never interleave.

mod api;
mod frontend;

use std::collections::HashMap;
use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::analytics;
use crate::config::FloorviewConfig;
use crate::fetch::Source;
use crate::page::PageKind;
use crate::page::controller::{Controller, RenderOutcome};
use crate::page::html::render_document;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Errors are handled per request without
/// stopping the server.
pub fn serve(addr: &str, cfg: FloorviewConfig) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("floorview dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if cfg.server.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    let mut dashboard = Dashboard::new(cfg);

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = dashboard.dispatch(&method, &url).unwrap_or_else(|e| {
            Reply::json(500, &serde_json::json!({ "error": format!("{e:#}") }).to_string())
        });
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A handler result, converted to a `tiny_http` response at the edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn not_found() -> Self {
        Self::json(404, r#"{"error": "not found"}"#)
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let response = Response::from_data(self.body.into_bytes())
            .with_status_code(StatusCode(self.status));
        match content_type(self.content_type) {
            Some(header) => response.with_header(header),
            None => response,
        }
    }
}

fn content_type(value: &str) -> Option<Header> {
    Header::from_bytes("Content-Type", value).ok()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Server state: the resolved config and one controller per page.
///
/// Controllers persist across requests so a page keeps its last state; each
/// page request still refetches and rebuilds it.
pub struct Dashboard {
    cfg: FloorviewConfig,
    controllers: HashMap<PageKind, Controller>,
}

impl Dashboard {
    pub fn new(cfg: FloorviewConfig) -> Self {
        Self {
            cfg,
            controllers: HashMap::new(),
        }
    }

    /// Dispatch an incoming request to the appropriate handler.
    pub fn dispatch(&mut self, method: &Method, url: &str) -> Result<Reply> {
        // Strip query string for path matching
        let path = url.split('?').next().unwrap_or(url);

        if *method != Method::Get {
            return Ok(Reply::not_found());
        }

        match path {
            "/" | "/index.html" => Ok(Reply::html(200, frontend::INDEX_HTML.to_string())),
            "/api/stats" => api::get_stats(url),
            "/api/health" => api::get_health(&self.cfg),
            "/api/config" => api::get_config(&self.cfg),
            _ => {
                if let Some(slug) = path.strip_prefix("/api/facets/") {
                    return match PageKind::from_slug(slug) {
                        Some(kind) => {
                            let (controller, outcome) = self.refresh(kind);
                            api::get_facets(controller, &outcome)
                        }
                        None => Ok(Reply::not_found()),
                    };
                }
                match PageKind::from_path(path) {
                    Some(kind) => self.serve_page(kind),
                    None => Ok(Reply::not_found()),
                }
            }
        }
    }

    fn serve_page(&mut self, kind: PageKind) -> Result<Reply> {
        let assets = self.cfg.assets.clone();
        let (controller, outcome) = self.refresh(kind);
        // A failed load still renders (with its banner), flagged as 502
        let status = if outcome.success { 200 } else { 502 };
        Ok(Reply::html(status, render_document(controller.page(), &assets)))
    }

    /// Refresh the page's controller, creating it on first use.
    fn refresh(&mut self, kind: PageKind) -> (&Controller, RenderOutcome) {
        let location = kind.source_location(&self.cfg.sources).to_string();
        let controller = self
            .controllers
            .entry(kind)
            .or_insert_with(|| Controller::new(kind, Source::parse(&location)));
        let outcome = controller.refresh();
        analytics::record(&outcome, &self.cfg.logging);
        (controller, outcome)
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
