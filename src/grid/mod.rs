//! Grid model for the tabular dashboards.
//!
//! Mirrors the lifecycle of the browser-side table widget: a grid is
//! constructed from a [`GridConfig`] (columns and search panes), rows are
//! queued with [`Grid::add_row`], [`Grid::draw`] commits the queue, and
//! [`Grid::rebuild_pane`] recomputes a pane's option counts against the
//! drawn rows. Panes are configured before any rows exist, so every pane
//! must be rebuilt after the draw.
//!
//! [`html`] turns a drawn grid into table markup plus the widget config.

pub mod expr;
pub mod html;

use serde::Serialize;

use crate::facets::FacetPane;

// ---------------------------------------------------------------------------
// Columns and rows
// ---------------------------------------------------------------------------

/// How a column orders its cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    /// The widget's default ordering of the cell text.
    #[default]
    Text,
    /// Numeric value of an arithmetic expression, precomputed on insert.
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub title: String,
    pub sort: SortKind,
}

impl Column {
    pub fn text(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sort: SortKind::Text,
        }
    }

    pub fn expression(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sort: SortKind::Expression,
        }
    }
}

/// Row styling applied when the widget creates the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowClass {
    Confident,
    Tentative,
}

impl RowClass {
    pub fn css(self) -> &'static str {
        match self {
            Self::Confident => "confident",
            Self::Tentative => "tentative",
        }
    }
}

/// One positional row. Cell order must match the grid's column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub cells: Vec<String>,
    pub class: RowClass,
    /// Precomputed sort keys, parallel to `cells`; filled on insert.
    #[serde(skip)]
    order_keys: Vec<Option<f64>>,
}

impl GridRow {
    pub fn new(cells: Vec<String>, class: RowClass) -> Self {
        Self {
            cells,
            class,
            order_keys: Vec::new(),
        }
    }

    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// Numeric sort key for an expression column, if it evaluated.
    pub fn order_key(&self, column: usize) -> Option<f64> {
        self.order_keys.get(column).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Construction-time grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridConfig {
    /// DOM id of the `<table>` element.
    pub table_id: String,
    pub columns: Vec<Column>,
    pub panes: Vec<FacetPane>,
}

#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    pending: Vec<GridRow>,
    rows: Vec<GridRow>,
    draws: usize,
}

impl Grid {
    pub fn construct(config: GridConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            rows: Vec::new(),
            draws: 0,
        }
    }

    /// Queue a row for the next draw, computing expression sort keys now.
    pub fn add_row(&mut self, mut row: GridRow) {
        row.order_keys = self
            .config
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| match col.sort {
                SortKind::Expression => expr::sort_key(row.cell(i)),
                SortKind::Text => None,
            })
            .collect();
        self.pending.push(row);
    }

    /// Commit queued rows in insertion order.
    pub fn draw(&mut self) {
        self.rows.append(&mut self.pending);
        self.draws += 1;
    }

    /// Recompute the counts of the pane bound to `column`.
    ///
    /// Returns `false` if no pane is bound to that column.
    pub fn rebuild_pane(&mut self, column: usize) -> bool {
        let Some(pane) = self.config.panes.iter_mut().find(|p| p.column == column) else {
            return false;
        };
        pane.rebuild(&self.rows);
        true
    }

    /// Rebuild every configured pane.
    pub fn rebuild_panes(&mut self) {
        for column in self.pane_columns() {
            self.rebuild_pane(column);
        }
    }

    pub fn table_id(&self) -> &str {
        &self.config.table_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.config.columns
    }

    pub fn panes(&self) -> &[FacetPane] {
        &self.config.panes
    }

    pub fn pane_columns(&self) -> Vec<usize> {
        self.config.panes.iter().map(|p| p.column).collect()
    }

    /// Rows committed by [`Grid::draw`].
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Rows added since the last draw.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn draw_count(&self) -> usize {
        self.draws
    }

    /// Total options across all panes.
    pub fn option_count(&self) -> usize {
        self.config.panes.iter().map(|p| p.options.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
