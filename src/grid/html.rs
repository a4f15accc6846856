//! HTML output for a drawn [`Grid`].
//!
//! The table is emitted fully populated (so a saved page is readable with
//! scripts disabled) together with a JSON widget config. The page script
//! reads the config, maps each serialized predicate back into a search-pane
//! option callback, and initializes the widget over the existing rows.

use std::fmt::Write as _;

use serde_json::{Value, json};

use super::{Grid, SortKind};

/// `data-order` value for expression cells that did not evaluate.
const UNSORTABLE_KEY: i32 = -1;

/// Render the `<table>` element with header and drawn rows.
///
/// Expression columns carry their precomputed key in `data-order`, which the
/// widget uses for ordering instead of the cell text.
pub fn render_table(grid: &Grid) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<table class="display compact cell-border" id="{}"><thead><tr>"#,
        html_escape(grid.table_id())
    );
    for column in grid.columns() {
        let _ = write!(out, "<th>{}</th>", html_escape(&column.title));
    }
    out.push_str("</tr></thead><tbody>");

    for row in grid.rows() {
        let _ = write!(out, r#"<tr class="{}">"#, row.class.css());
        for (i, column) in grid.columns().iter().enumerate() {
            let cell = html_escape(row.cell(i));
            match (column.sort, row.order_key(i)) {
                (SortKind::Expression, Some(key)) => {
                    let _ = write!(out, r#"<td data-order="{key}">{cell}</td>"#);
                }
                // Progress keys are non-negative; unevaluable cells sort first
                (SortKind::Expression, None) => {
                    let _ = write!(out, r#"<td data-order="{UNSORTABLE_KEY}">{cell}</td>"#);
                }
                (SortKind::Text, _) => {
                    let _ = write!(out, "<td>{cell}</td>");
                }
            }
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table>");
    out
}

/// Widget construction options for the grid.
pub fn widget_config(grid: &Grid) -> Value {
    let panes: Vec<Value> = grid
        .panes()
        .iter()
        .map(|pane| {
            json!({
                "header": pane.header,
                "column": pane.column,
                "options": pane.options,
                "counts": pane.counts,
            })
        })
        .collect();

    json!({
        "tableId": grid.table_id(),
        "autoWidth": false,
        "colReorder": true,
        "select": true,
        "pageLength": -1,
        "lengthMenu": [[10, 25, 50, 100, -1], [10, 25, 50, 100, "All"]],
        "buttons": ["pageLength", "copy", "excel", "pdf", "print"],
        "paneLayout": format!("columns-{}", grid.panes().len()),
        "panes": panes,
    })
}

/// Serialize a JSON value for embedding inside a `<script>` element.
pub fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::{FacetPane, fixed_facets};
    use crate::grid::{Column, GridConfig, GridRow, RowClass};

    fn drawn_grid() -> Grid {
        let mut grid = Grid::construct(GridConfig {
            table_id: "qualityTable".to_string(),
            columns: vec![Column::text("Work Order"), Column::expression("Progress")],
            panes: vec![FacetPane::new("Work Order", 0, fixed_facets(&["1"], 0))],
        });
        grid.add_row(GridRow::new(
            vec!["1".to_string(), "1/4".to_string()],
            RowClass::Tentative,
        ));
        grid.add_row(GridRow::new(
            vec!["<b>".to_string(), "?".to_string()],
            RowClass::Confident,
        ));
        grid.draw();
        grid.rebuild_panes();
        grid
    }

    #[test]
    fn table_contains_header_rows_and_sort_keys() {
        let html = render_table(&drawn_grid());
        assert!(html.starts_with(r#"<table class="display compact cell-border" id="qualityTable">"#));
        assert!(html.contains("<th>Work Order</th><th>Progress</th>"));
        assert!(html.contains(r#"<tr class="tentative"><td>1</td><td data-order="0.25">1/4</td></tr>"#));
        assert!(html.contains(r#"<td data-order="-1">?</td>"#));
    }

    #[test]
    fn cells_are_escaped() {
        let html = render_table(&drawn_grid());
        assert!(html.contains("<td>&lt;b&gt;</td>"));
        assert!(!html.contains("<td><b></td>"));
    }

    #[test]
    fn widget_config_carries_panes_and_counts() {
        let config = widget_config(&drawn_grid());
        assert_eq!(config["tableId"], "qualityTable");
        assert_eq!(config["pageLength"], -1);
        assert_eq!(config["paneLayout"], "columns-1");
        assert_eq!(config["panes"][0]["counts"][0], 1);
        assert_eq!(config["panes"][0]["options"][0]["predicate"]["kind"], "equals");
    }

    #[test]
    fn script_json_cannot_close_the_script_tag() {
        let value = json!({ "label": "</script><script>alert(1)" });
        assert!(!script_json(&value).contains("</script>"));
    }

    #[test]
    fn html_escape_handles_quotes() {
        assert_eq!(html_escape(r#"a"b'c&"#), "a&quot;b&#39;c&amp;");
    }
}
