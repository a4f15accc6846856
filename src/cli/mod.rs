//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `floorview render <page>`: run one page pipeline and write the HTML
//! - `floorview facets <page>`: print facet panes with match counts
//! - `floorview stats`: render log summary
//! - `floorview health`: config files, source reachability, render log
//! - `floorview config show|init|set|reset`: configuration management

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::{self, logger};
use crate::analytics::reporter::{self, Stats};
use crate::config::{self, FloorviewConfig};
use crate::fetch::Source;
use crate::page::controller::{Controller, RenderOutcome};
use crate::page::html::render_document;
use crate::page::PageKind;

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Resolve a page name, listing the valid names on failure.
pub fn parse_page(name: &str) -> Result<PageKind> {
    PageKind::from_slug(name).with_context(|| {
        let valid: Vec<String> = PageKind::ALL.iter().map(|k| k.slug()).collect();
        format!("unknown page '{name}' (expected one of: {})", valid.join(", "))
    })
}

/// Run one refresh of `kind` against `source` (or the configured location)
/// and record it in the render log.
pub fn refresh_page(
    kind: PageKind,
    source: Option<&str>,
    cfg: &FloorviewConfig,
) -> (Controller, RenderOutcome) {
    let location = source.unwrap_or_else(|| kind.source_location(&cfg.sources));
    let mut controller = Controller::new(kind, Source::parse(location));
    let outcome = controller.refresh();
    analytics::record(&outcome, &cfg.logging);
    (controller, outcome)
}

// ---------------------------------------------------------------------------
// floorview render
// ---------------------------------------------------------------------------

/// Render one page to `out` (or stdout).
///
/// A load failure still writes the page, with its error banner, and then
/// returns the error.
pub fn run_render(page: &str, source: Option<&str>, out: Option<&Path>) -> Result<()> {
    let kind = parse_page(page)?;
    let cfg = config::load();
    let (controller, outcome) = refresh_page(kind, source, &cfg);
    let html = render_document(controller.page(), &cfg.assets);

    match out {
        Some(path) => {
            fs::write(path, &html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if outcome.success {
                eprintln!(
                    "{} {} → {} ({} rows, {} ms)",
                    "✓".green().bold(),
                    kind.slug(),
                    path.display(),
                    outcome.rows,
                    outcome.duration_ms
                );
            }
        }
        None => print!("{html}"),
    }

    if let Some(error) = outcome.error {
        anyhow::bail!("{}: {error}", kind.slug());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// floorview facets
// ---------------------------------------------------------------------------

/// Print the facet panes built for a page, with match counts.
pub fn run_facets(page: &str, source: Option<&str>, format: OutputFormat) -> Result<()> {
    let kind = parse_page(page)?;
    if matches!(kind, PageKind::Machines(_)) {
        println!("{}", "Machine pages have no facet panes.".yellow());
        return Ok(());
    }

    let cfg = config::load();
    let (controller, outcome) = refresh_page(kind, source, &cfg);
    if let Some(error) = outcome.error {
        anyhow::bail!("{}: {error}", kind.slug());
    }

    let summary = controller.page().facet_summary();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Csv => print!("{}", facets_csv(&summary)?),
        OutputFormat::Table => print_facets_table(kind, &summary),
    }
    Ok(())
}

/// One CSV line per facet option: pane header, column, label, count.
fn facets_csv(summary: &serde_json::Value) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["pane", "column", "label", "count"])?;

    let panes = summary["panes"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    for pane in panes {
        let header = pane["header"].as_str().unwrap_or_default();
        let column = pane["column"].to_string();
        let options = pane["options"].as_array().map(Vec::as_slice).unwrap_or(&[]);
        for option in options {
            writer.write_record([
                header,
                column.as_str(),
                option["label"].as_str().unwrap_or_default(),
                option["count"].to_string().as_str(),
            ])?;
        }
    }

    let bytes = writer.into_inner().context("failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn print_facets_table(kind: PageKind, summary: &serde_json::Value) {
    println!("{}", format!("{} Facets", kind.title()).bold().cyan());
    println!("{}", "=".repeat(50));

    let Some(panes) = summary["panes"].as_array() else {
        return;
    };
    for pane in panes {
        println!();
        println!(
            "{} {}",
            pane["header"].as_str().unwrap_or_default().bold(),
            format!("(column {})", pane["column"]).dimmed()
        );
        let options = pane["options"].as_array().map(Vec::as_slice).unwrap_or(&[]);
        if options.is_empty() {
            println!("  {}", "(no options)".dimmed());
        }
        for (i, option) in options.iter().enumerate() {
            let line = format!(
                "  {:<36} {:>6}",
                truncate(option["label"].as_str().unwrap_or_default(), 36),
                option["count"]
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// floorview stats
// ---------------------------------------------------------------------------

/// Show render log statistics.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let stats = reporter::compute_stats(days);

    if stats.total_renders == 0 {
        println!(
            "{}",
            "No data yet. Render or serve some pages to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "floorview Render Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Total renders:".bold(), stats.total_renders);
    println!("  {} {}", "Failures:     ".bold(), stats.failures);
    println!("  {} {:.1}%", "Success rate: ".bold(), stats.success_pct);
    println!("  {} {:.0} ms", "Avg duration: ".bold(), stats.avg_duration_ms);
    println!();

    println!("{}", "Pages".bold().cyan());
    println!(
        "  {:<26} {:>7} {:>8} {:>9} {:>8}",
        "Page", "Renders", "Failures", "Avg rows", "Avg ms"
    );
    println!("  {}", "-".repeat(62));
    for (i, page) in stats.page_stats.iter().enumerate() {
        let line = format!(
            "  {:<26} {:>7} {:>8} {:>9.1} {:>8.0}",
            truncate(&page.page, 26),
            page.renders,
            page.failures,
            page.avg_rows,
            page.avg_duration_ms,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
        if let Some(error) = &page.last_error {
            println!("    {} {}", "last error:".red(), truncate(error, 70).dimmed());
        }
    }

    if stats.daily.len() > 1 {
        println!();
        println!("{}", "Daily".bold().cyan());
        for day in &stats.daily {
            println!("  {:<12} {:>6} renders {:>4} failed", day.date, day.renders, day.failures);
        }
    }
}

fn print_stats_csv(stats: &Stats) {
    println!("page,renders,failures,avg_rows,avg_duration_ms,missing_fields,last_render");
    for page in &stats.page_stats {
        println!(
            "{},{},{},{:.1},{:.0},{},{}",
            page.page,
            page.renders,
            page.failures,
            page.avg_rows,
            page.avg_duration_ms,
            page.missing_fields,
            page.last_render,
        );
    }
}

// ---------------------------------------------------------------------------
// floorview health
// ---------------------------------------------------------------------------

/// Check config files, source reachability and the render log.
pub fn run_health() -> Result<()> {
    println!("{}", "floorview Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.floorview/config.toml found"
        } else {
            "not found (run `floorview config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".floorview.toml found"
        } else {
            "none (optional)"
        },
    );

    for (name, location) in [
        ("Machine source", &cfg.sources.machine_url),
        ("WIP source", &cfg.sources.wip_url),
        ("Work order source", &cfg.sources.work_order_url),
    ] {
        let ok = Source::parse(location).is_reachable();
        let detail = if ok {
            location.clone()
        } else {
            format!("{location} (unreachable)")
        };
        print_health_item(name, ok, &detail);
    }

    let log_exists = logger::render_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_detail = if !cfg.logging.enabled {
        "disabled".to_string()
    } else if log_exists {
        format!("{} entries", logger::read_all_entries().len())
    } else {
        "no log file yet".to_string()
    };
    print_health_item("Render log", log_exists || !cfg.logging.enabled, &log_detail);

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// floorview config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;

    println!("{}", "Effective floorview Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_layer("~/.floorview/config.toml", global_exists);
    print_layer(".floorview.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "FLOORVIEW_* environment variables".dimmed()
    );

    Ok(())
}

fn print_layer(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.floorview/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point at your CSV sources.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Truncate to `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::machines::MachineView;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn parse_page_lists_valid_names() {
        assert_eq!(
            parse_page("machines-grinding").unwrap(),
            PageKind::Machines(MachineView::Grinding)
        );
        let err = parse_page("lathes").unwrap_err().to_string();
        assert!(err.contains("unknown page 'lathes'"));
        assert!(err.contains("machines-lathes-millturn"));
    }

    #[test]
    fn facets_csv_quotes_labels() {
        let summary = serde_json::json!({
            "page": "wip",
            "panes": [{
                "header": "Outstanding Qty Greater Than",
                "column": 4,
                "options": [{ "label": "1,200", "count": 3 }, { "label": "50", "count": 7 }],
            }],
        });
        let out = facets_csv(&summary).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "pane,column,label,count",
                "Outstanding Qty Greater Than,4,\"1,200\",3",
                "Outstanding Qty Greater Than,4,50,7",
            ]
        );
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Outstanding Qty Greater Than", 10), "Outstandi…");
    }

    #[test]
    fn refresh_page_prefers_explicit_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wip.csv");
        fs::write(
            &path,
            "wo_num,part_num,description,customer,qty_tbr,yield,due,timestamp\n40100,A,W,Acme,3,1,1,now\n",
        )
        .unwrap();

        let mut cfg = FloorviewConfig::default();
        cfg.logging.enabled = false;
        let (controller, outcome) =
            refresh_page(PageKind::Wip, path.to_str(), &cfg);
        assert!(outcome.success);
        assert_eq!(outcome.rows, 1);
        assert!(controller.page().grid().is_some());
    }
}
