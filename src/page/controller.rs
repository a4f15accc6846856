//! Page controllers: the fetch → classify → facet → render → stamp pipeline.
//!
//! One [`Controller`] owns one [`Page`]. Every [`Controller::refresh`] starts
//! from `Idle`, fetches a fresh dataset, tears the page's containers down and
//! rebuilds them. A load failure leaves the controller in `Error` with a
//! visible banner in place of the content; the next refresh starts over.

use std::time::Instant;

use serde::Serialize;

use crate::classify::machines;
use crate::classify::orders::{self, QualityStatus, mrb, quality, wip};
use crate::classify::Classified;
use crate::dataset::Dataset;
use crate::facets::{self, FacetPane};
use crate::fetch::{self, LoadError, Source};
use crate::grid::{Column, Grid, GridConfig, GridRow};

use super::{Node, Page, PageKind, STATUS_CONTAINER, TABLE_CONTAINER, TILE_CLASS};

pub const WIP_TABLE_ID: &str = "WIPTable";
pub const QUALITY_TABLE_ID: &str = "qualityTable";

const WORK_ORDER_RANGE: &str = "Work Order Range";
const COMPLETION_YEAR: &str = "Completion Confirmation Year";

// ---------------------------------------------------------------------------
// Stages and outcomes
// ---------------------------------------------------------------------------

/// Pipeline stage of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Fetching,
    Parsed,
    Classifying,
    FacetBuilding,
    Rendering,
    Error,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsed => "parsed",
            Self::Classifying => "classifying",
            Self::FacetBuilding => "facet_building",
            Self::Rendering => "rendering",
            Self::Error => "error",
        }
    }
}

/// Summary of one refresh, written to the render log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutcome {
    pub page: String,
    pub stage: Stage,
    pub success: bool,
    /// Records in the fetched dataset, trailer included.
    pub records: usize,
    /// Tiles or grid rows rendered.
    pub rows: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub missing_fields: usize,
    pub facet_options: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counters gathered while rendering a dataset.
#[derive(Debug, Default)]
struct RenderCounts {
    rows: usize,
    dropped: usize,
    skipped: usize,
    missing_fields: usize,
    facet_options: usize,
}

impl RenderCounts {
    fn from_classified<T>(classified: &Classified<T>) -> Self {
        Self {
            rows: classified.items.len(),
            dropped: classified.dropped,
            skipped: classified.skipped,
            missing_fields: classified.missing_fields,
            facet_options: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller {
    kind: PageKind,
    source: Source,
    page: Page,
    stage: Stage,
    trace: Vec<Stage>,
}

impl Controller {
    pub fn new(kind: PageKind, source: Source) -> Self {
        Self {
            kind,
            source,
            page: Page::new(kind),
            stage: Stage::Idle,
            trace: vec![Stage::Idle],
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stages visited by the last refresh, in order.
    pub fn trace(&self) -> &[Stage] {
        &self.trace
    }

    /// Fetch a fresh snapshot and rebuild the page from it.
    pub fn refresh(&mut self) -> RenderOutcome {
        let started = Instant::now();
        self.trace.clear();
        self.enter(Stage::Idle);
        self.enter(Stage::Fetching);

        match fetch::fetch_dataset(&self.source) {
            Ok(dataset) => {
                self.enter(Stage::Parsed);
                let counts = self.render_dataset(&dataset);
                self.outcome(started, dataset.len(), counts, None)
            }
            Err(e) => {
                self.fail(&e);
                self.outcome(started, 0, RenderCounts::default(), Some(e.to_string()))
            }
        }
    }

    /// Rebuild the page from an already parsed dataset.
    pub fn refresh_with(&mut self, dataset: &Dataset) -> RenderOutcome {
        let started = Instant::now();
        self.trace.clear();
        self.enter(Stage::Idle);
        self.enter(Stage::Parsed);
        let counts = self.render_dataset(dataset);
        self.outcome(started, dataset.len(), counts, None)
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.trace.push(stage);
    }

    fn fail(&mut self, error: &LoadError) {
        self.enter(Stage::Error);
        self.teardown();
        self.page.remove_by_id(self.kind.timestamp_id());
        self.page.append(
            STATUS_CONTAINER,
            Node::Banner {
                message: format!("Failed to load data: {error}"),
            },
        );
    }

    fn outcome(
        &self,
        started: Instant,
        records: usize,
        counts: RenderCounts,
        error: Option<String>,
    ) -> RenderOutcome {
        RenderOutcome {
            page: self.kind.slug(),
            stage: self.stage,
            success: error.is_none(),
            records,
            rows: counts.rows,
            dropped: counts.dropped,
            skipped: counts.skipped,
            missing_fields: counts.missing_fields,
            facet_options: counts.facet_options,
            duration_ms: started.elapsed().as_millis() as u64,
            error,
        }
    }

    /// Remove every node the previous render produced.
    fn teardown(&mut self) {
        self.page.clear(STATUS_CONTAINER);
        match self.kind {
            PageKind::Machines(_) => {
                self.page.remove_by_class(TILE_CLASS);
            }
            _ => self.page.clear(TABLE_CONTAINER),
        }
    }

    fn render_dataset(&mut self, dataset: &Dataset) -> RenderCounts {
        self.teardown();
        let counts = match self.kind {
            PageKind::Machines(view) => self.render_machines(dataset, view),
            PageKind::Wip => {
                self.enter(Stage::Classifying);
                let rows = orders::wip_rows(dataset);
                self.enter(Stage::FacetBuilding);
                let panes = wip_panes(dataset);
                self.render_grid(WIP_TABLE_ID, orders::wip_columns(), panes, rows)
            }
            PageKind::Quality => {
                self.enter(Stage::Classifying);
                let rows = orders::quality_rows(dataset);
                self.enter(Stage::FacetBuilding);
                let panes = quality_panes(dataset);
                self.render_grid(QUALITY_TABLE_ID, orders::quality_columns(), panes, rows)
            }
            PageKind::Mrb => {
                self.enter(Stage::Classifying);
                let rows = orders::mrb_rows(dataset);
                self.enter(Stage::FacetBuilding);
                let panes = mrb_panes(dataset);
                self.render_grid(QUALITY_TABLE_ID, orders::mrb_columns(), panes, rows)
            }
        };
        self.stamp(dataset);
        self.enter(Stage::Idle);
        counts
    }

    fn render_machines(&mut self, dataset: &Dataset, view: machines::MachineView) -> RenderCounts {
        self.enter(Stage::Classifying);
        let routed = machines::route(dataset, view);
        let counts = RenderCounts::from_classified(&routed);

        self.enter(Stage::Rendering);
        for (category, tile) in routed.items {
            self.page
                .append(category.container_id(), Node::Tile { category, tile });
        }
        counts
    }

    fn render_grid(
        &mut self,
        table_id: &str,
        columns: Vec<Column>,
        panes: Vec<FacetPane>,
        rows: Classified<GridRow>,
    ) -> RenderCounts {
        let mut counts = RenderCounts::from_classified(&rows);

        self.enter(Stage::Rendering);
        let mut grid = Grid::construct(GridConfig {
            table_id: table_id.to_string(),
            columns,
            panes,
        });
        for row in rows.items {
            grid.add_row(row);
        }
        grid.draw();
        grid.rebuild_panes();

        counts.facet_options = grid.option_count();
        self.page.append(TABLE_CONTAINER, Node::Grid(Box::new(grid)));
        counts
    }

    /// Replace the timestamp element with the first record's `timestamp`.
    fn stamp(&mut self, dataset: &Dataset) {
        let id = self.kind.timestamp_id();
        self.page.remove_by_id(id);
        let raw = dataset.first().map(|r| r.value("timestamp")).unwrap_or("");
        self.page.append(
            self.kind.timestamp_container(),
            Node::Timestamp {
                id,
                text: format!("Last updated: {raw}"),
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Pane layouts
// ---------------------------------------------------------------------------

pub fn wip_panes(dataset: &Dataset) -> Vec<FacetPane> {
    let key = orders::WO_NUM;
    vec![
        FacetPane::new(
            WORK_ORDER_RANGE,
            wip::WORK_ORDER,
            facets::range_facets(dataset, key, wip::WORK_ORDER),
        ),
        FacetPane::new(
            "Part Number",
            wip::PART_NUMBER,
            facets::distinct_facets(dataset, key, "part_num", wip::PART_NUMBER),
        ),
        FacetPane::new(
            "Customer",
            wip::CUSTOMER,
            facets::distinct_facets(dataset, key, "customer", wip::CUSTOMER),
        ),
        FacetPane::new(
            "Outstanding Qty Greater Than",
            wip::OUTSTANDING_QTY,
            facets::threshold_facets(dataset, key, "qty_tbr", wip::OUTSTANDING_QTY),
        ),
    ]
}

pub fn quality_panes(dataset: &Dataset) -> Vec<FacetPane> {
    vec![
        FacetPane::new(
            WORK_ORDER_RANGE,
            quality::WORK_ORDER,
            facets::range_facets(dataset, orders::WO_NUM, quality::WORK_ORDER),
        ),
        FacetPane::new(
            "Status",
            quality::STATUS,
            facets::fixed_facets(&QualityStatus::LABELS, quality::STATUS),
        ),
        FacetPane::new(
            COMPLETION_YEAR,
            quality::COMPLETION_DATE,
            facets::year_facets(dataset, orders::WO_NUM, "date", quality::COMPLETION_DATE),
        ),
    ]
}

pub fn mrb_panes(dataset: &Dataset) -> Vec<FacetPane> {
    vec![
        FacetPane::new(
            WORK_ORDER_RANGE,
            mrb::WORK_ORDER,
            facets::range_facets(dataset, orders::WO_NUM, mrb::WORK_ORDER),
        ),
        FacetPane::new(
            COMPLETION_YEAR,
            mrb::COMPLETION_DATE,
            facets::year_facets_by(
                dataset,
                orders::WO_NUM,
                "mrb_date",
                mrb::COMPLETION_DATE,
                orders::iso_date,
            ),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
