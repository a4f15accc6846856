//! Full HTML documents for rendered pages.

use std::fmt::Write as _;

use crate::classify::machines::{MachineCategory, MachineTile};
use crate::config::schema::AssetsConfig;
use crate::grid::html::{html_escape, render_table, script_json, widget_config};

use super::{Container, Node, Page, PageKind};

/// Render `page` as a standalone document.
pub fn render_document(page: &Page, assets: &AssetsConfig) -> String {
    let kind = page.kind();
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | floorview</title>
<link rel="stylesheet" href="{bootstrap}">
<link rel="stylesheet" href="{dt_css}">
<style>{css}</style>
</head>
<body>
"#,
        title = html_escape(kind.title()),
        bootstrap = html_escape(&assets.bootstrap_css),
        dt_css = html_escape(&assets.datatables_css),
        css = PAGE_CSS,
    );

    out.push_str(&nav(kind));
    let _ = write!(
        out,
        r#"<main class="container-fluid"><h1 class="mt-3">{}</h1>"#,
        html_escape(kind.title())
    );

    for container in page.containers() {
        out.push_str(&render_container(container));
    }
    out.push_str("</main>\n");

    if !matches!(kind, PageKind::Machines(_)) {
        let _ = write!(
            out,
            "<script src=\"{}\"></script>\n<script>{}</script>\n",
            html_escape(&assets.datatables_js),
            GRID_SCRIPT
        );
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn nav(current: PageKind) -> String {
    let mut out = String::from(
        r#"<nav class="navbar navbar-expand bg-dark navbar-dark px-3"><a class="navbar-brand" href="/">floorview</a><ul class="navbar-nav">"#,
    );
    for kind in PageKind::ALL {
        let active = if kind == current { " active" } else { "" };
        let _ = write!(
            out,
            r#"<li class="nav-item"><a class="nav-link{active}" href="{}">{}</a></li>"#,
            kind.path(),
            html_escape(kind.title())
        );
    }
    out.push_str("</ul></nav>\n");
    out
}

fn render_container(container: &Container) -> String {
    let mut out = String::new();

    if let Some(category) = MachineCategory::ALL
        .into_iter()
        .find(|c| c.container_id() == container.id)
    {
        let _ = write!(out, r#"<h2 class="mt-3">{}</h2>"#, category.label());
        let _ = write!(out, r#"<div id="{}" class="row g-0">"#, container.id);
    } else {
        let _ = write!(out, r#"<div id="{}" class="d-flex">"#, container.id);
    }

    for node in &container.nodes {
        out.push_str(&render_node(node));
    }
    out.push_str("</div>\n");
    out
}

fn render_node(node: &Node) -> String {
    match node {
        Node::Tile { tile, .. } => render_tile(tile),
        Node::Grid(grid) => format!(
            r#"{}<script type="application/json" class="grid-config">{}</script>"#,
            render_table(grid),
            script_json(&widget_config(grid))
        ),
        Node::Timestamp { id, text } => format!(
            r#"<div id="{id}" class="me-auto ms-auto fs-4">{}</div>"#,
            html_escape(text)
        ),
        Node::Banner { message } => format!(
            r#"<div class="alert alert-danger load-error w-100" role="alert">{}</div>"#,
            html_escape(message)
        ),
    }
}

fn render_tile(tile: &MachineTile) -> String {
    format!(
        r#"<div class="col-md border border-dark fs-3 text-center {}">{}<br>{}%</div>"#,
        tile.state.css(),
        html_escape(&tile.name),
        html_escape(&tile.uptime_percent)
    )
}

const PAGE_CSS: &str = r#"
.machine-on { background-color: #5cb85c; }
.machine-idle { background-color: #f0ad4e; }
.machine-off { background-color: #d9534f; }
tr.confident td { background-color: #dff0d8; }
tr.tentative td { background-color: #fcf8e3; }
#timestampContainer, #timestamp { margin-top: 1rem; }
"#;

/// Builds each grid widget from its embedded JSON config. Facet predicates
/// arrive as `{kind, column, ...}` descriptors and become search-pane option
/// callbacks over the row's cell text.
const GRID_SCRIPT: &str = r#"
(function () {
  const decoder = document.createElement('textarea');
  function text(cell) {
    if (cell !== null && typeof cell === 'object') cell = cell.display;
    decoder.innerHTML = cell == null ? '' : String(cell);
    return decoder.value;
  }
  function num(s) {
    s = s.trim();
    if (s === '') return 0;
    const v = Number(s);
    return Number.isFinite(v) ? v : NaN;
  }
  function predicate(p) {
    switch (p.kind) {
      case 'range':
        return function (row) { const v = num(text(row[p.column])); return v >= p.start && v < p.end; };
      case 'equals':
        return function (row) { return text(row[p.column]) === p.value; };
      case 'contains':
        return function (row) { return text(row[p.column]).includes(p.needle); };
      case 'greater_than':
        return function (row) {
          return p.threshold !== null && num(text(row[p.column]).replace(/,/g, '')) > p.threshold;
        };
      default:
        return function () { return false; };
    }
  }
  document.querySelectorAll('script.grid-config').forEach(function (el) {
    const cfg = JSON.parse(el.textContent);
    const columnDefs = [{ targets: '_all', className: 'dt-body-left dt-head-left' }];
    cfg.panes.forEach(function (pane) {
      columnDefs.push({
        targets: [pane.column],
        searchPanes: {
          header: pane.header,
          show: true,
          options: pane.options.map(function (o) {
            return { label: o.label, value: predicate(o.predicate) };
          })
        }
      });
    });
    new DataTable('#' + cfg.tableId, {
      autoWidth: cfg.autoWidth,
      colReorder: cfg.colReorder,
      select: cfg.select,
      columnDefs: columnDefs,
      layout: {
        topStart: { buttons: cfg.buttons },
        top1: {
          searchPanes: { layout: cfg.paneLayout, columns: cfg.panes.map(function (p) { return p.column; }) }
        },
        topEnd: 'search',
        bottomStart: 'info',
        bottomEnd: 'paging'
      },
      lengthMenu: cfg.lengthMenu,
      pageLength: cfg.pageLength
    });
  });
})();
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::machines::{MachineView, PowerState};
    use crate::page::controller::Controller;
    use crate::fetch::Source;

    #[test]
    fn tiles_render_state_class_name_and_uptime() {
        let html = render_tile(&MachineTile {
            name: "Okuma <1>".to_string(),
            uptime_percent: "91".to_string(),
            state: PowerState::Idle,
        });
        assert_eq!(
            html,
            r#"<div class="col-md border border-dark fs-3 text-center machine-idle">Okuma &lt;1&gt;<br>91%</div>"#
        );
    }

    #[test]
    fn machine_document_has_containers_and_timestamp() {
        let mut controller = Controller::new(
            PageKind::Machines(MachineView::All),
            Source::Inline(
                "device_name,power_status,uptime_percent,machine_category,timestamp\nM1,2,50,Grinding,today\n"
                    .to_string(),
            ),
        );
        controller.refresh();
        let html = render_document(controller.page(), &AssetsConfig::default());

        for id in ["lathes", "millturn", "mill4ax", "mill5ax", "grinding", "timestamp"] {
            assert!(html.contains(&format!(r#"id="{id}""#)), "missing #{id}");
        }
        assert!(html.contains(r#"<div id="current-time" class="me-auto ms-auto fs-4">Last updated: today</div>"#));
        assert!(html.contains("machine-on"));
        assert!(!html.contains("grid-config"));
    }

    #[test]
    fn grid_document_embeds_table_config_and_script() {
        let mut controller = Controller::new(
            PageKind::Wip,
            Source::Inline(
                "wo_num,part_num,description,customer,qty_tbr,yield,due,timestamp\n40100,A,W,Acme,3,1,1,now\n"
                    .to_string(),
            ),
        );
        controller.refresh();
        let html = render_document(controller.page(), &AssetsConfig::default());

        assert!(html.contains(r#"id="tableContainer""#));
        assert!(html.contains(r#"id="WIPTable""#));
        assert!(html.contains(r#"<script type="application/json" class="grid-config">"#));
        assert!(html.contains("new DataTable("));
        assert!(html.contains(r#"<div id="timestamp" class="me-auto ms-auto fs-4">Last updated: now</div>"#));
    }

    #[test]
    fn banner_is_rendered_on_failure() {
        let mut controller = Controller::new(
            PageKind::Mrb,
            Source::File("/nonexistent/floorview/wo_data.csv".into()),
        );
        controller.refresh();
        let html = render_document(controller.page(), &AssetsConfig::default());
        assert!(html.contains("load-error"));
        assert!(html.contains("Failed to load data"));
    }
}
