//! Work order and WIP row classification.
//!
//! Each table has a fixed column layout; the index constants below are the
//! positions facet predicates address, so rows must be built in exactly this
//! order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::dataset::{Dataset, Record};
use crate::grid::{Column, GridRow, RowClass};

use super::Classified;

pub const WO_NUM: &str = "wo_num";

// ---------------------------------------------------------------------------
// WIP
// ---------------------------------------------------------------------------

pub mod wip {
    pub const WORK_ORDER: usize = 0;
    pub const PART_NUMBER: usize = 1;
    pub const CUSTOMER: usize = 3;
    pub const OUTSTANDING_QTY: usize = 4;

    pub const FIELDS: [&str; 7] = [
        "wo_num",
        "part_num",
        "description",
        "customer",
        "qty_tbr",
        "yield",
        "due",
    ];

    pub const TITLES: [&str; 7] = [
        "Work Order",
        "Part Number",
        "Description",
        "Customer",
        "Outstanding Qty",
        "Yield Qty",
        "Qty Due",
    ];
}

/// Every WIP record with a work order number becomes a row.
pub fn wip_rows(dataset: &Dataset) -> Classified<GridRow> {
    let mut out = Classified::default();
    for record in dataset {
        if record.is_blank(WO_NUM) {
            out.skipped += 1;
            continue;
        }
        out.missing_fields += record.count_missing(&wip::FIELDS);
        out.items.push(GridRow::new(
            cells(record, &wip::FIELDS),
            RowClass::Confident,
        ));
    }
    out
}

pub fn wip_columns() -> Vec<Column> {
    wip::TITLES.iter().map(|t| Column::text(*t)).collect()
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

pub mod quality {
    pub const WORK_ORDER: usize = 0;
    pub const STATUS: usize = 1;
    pub const COMPLETION_DATE: usize = 5;
    pub const PROGRESS: usize = 6;

    pub const TITLES: [&str; 7] = [
        "Work Order",
        "Status",
        "Part Number",
        "Description",
        "Qty in Quality",
        "Quality Completion Confirmation Date",
        "Work Order Entry Number",
    ];

    pub(super) const FIELDS: [&str; 7] = [
        "wo_num",
        "in_quality",
        "part_num",
        "description",
        "qty",
        "date",
        "progress",
    ];
}

/// Quality status carried by `in_quality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityStatus {
    InQuality,
    Tentative,
}

impl QualityStatus {
    pub const LABELS: [&str; 2] = ["In Quality", "Tentative"];

    /// `"2"` is in quality, `"1"` tentative; anything else is not shown.
    pub fn from_field(value: &str) -> Option<Self> {
        match value {
            "2" => Some(Self::InQuality),
            "1" => Some(Self::Tentative),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InQuality => Self::LABELS[0],
            Self::Tentative => Self::LABELS[1],
        }
    }

    pub fn row_class(self) -> RowClass {
        match self {
            Self::InQuality => RowClass::Confident,
            Self::Tentative => RowClass::Tentative,
        }
    }
}

/// Rows for the quality table, labelled by status.
pub fn quality_rows(dataset: &Dataset) -> Classified<GridRow> {
    let mut out = Classified::default();
    for record in dataset {
        let Some(status) = QualityStatus::from_field(record.value("in_quality")) else {
            out.dropped += 1;
            continue;
        };
        if record.is_blank(WO_NUM) {
            out.skipped += 1;
            continue;
        }

        out.missing_fields += record.count_missing(&quality::FIELDS);
        let mut row = cells(record, &quality::FIELDS);
        row[quality::STATUS] = status.label().to_string();
        out.items.push(GridRow::new(row, status.row_class()));
    }
    out
}

pub fn quality_columns() -> Vec<Column> {
    quality::TITLES
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if i == quality::PROGRESS {
                Column::expression(*t)
            } else {
                Column::text(*t)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// MRB
// ---------------------------------------------------------------------------

pub mod mrb {
    pub const WORK_ORDER: usize = 0;
    pub const COMPLETION_DATE: usize = 4;

    pub const TITLES: [&str; 5] = [
        "Work Order",
        "Part Number",
        "Description",
        "Qty in MRB",
        "Latest MRB Completion Confirmation Date",
    ];

    pub(super) const FIELDS: [&str; 5] = ["wo_num", "part_num", "description", "mrb_qty", "mrb_date"];
}

/// Value of the `mrb` flag that marks a work order as held in MRB.
pub const MRB_FLAG: &str = "True";

/// Rows for work orders flagged `mrb == "True"`, with the date reduced to
/// `YYYY-MM-DD`.
pub fn mrb_rows(dataset: &Dataset) -> Classified<GridRow> {
    let mut out = Classified::default();
    for record in dataset {
        if record.value("mrb") != MRB_FLAG {
            out.dropped += 1;
            continue;
        }
        if record.is_blank(WO_NUM) {
            out.skipped += 1;
            continue;
        }

        out.missing_fields += record.count_missing(&mrb::FIELDS);
        let mut row = cells(record, &mrb::FIELDS);
        row[mrb::COMPLETION_DATE] = iso_date(&row[mrb::COMPLETION_DATE]);
        out.items.push(GridRow::new(row, RowClass::Confident));
    }
    out
}

pub fn mrb_columns() -> Vec<Column> {
    mrb::TITLES.iter().map(|t| Column::text(*t)).collect()
}

/// Reduce a timestamp to its UTC calendar date (`YYYY-MM-DD`).
///
/// Values with an explicit offset are converted to UTC first; naive values
/// are taken as-is. Anything unrecognised is returned unchanged.
pub fn iso_date(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }

    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return dt.format("%Y-%m-%d").to_string();
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.format("%Y-%m-%d").to_string();
        }
    }

    raw.to_string()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Positional cells for `fields`, missing columns read as empty.
fn cells(record: &Record, fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| record.value(f).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse;

    const WO_CSV: &str = "\
wo_num,in_quality,part_num,description,qty,date,progress,mrb,mrb_qty,mrb_date,timestamp
31001,2,P-100,Bracket,12,2023-05-01,1/3,False,,,2024-03-01 07:00
31002,1,P-200,Housing,4,No Completion Confirmation,2/3,True,2,2023-11-30T22:15:00Z,
31003,0,P-300,Shaft,8,2022-01-04,3/3,True,1,2024-01-02 08:00:00,
,2,P-400,Blank,1,2022-01-04,1/1,True,1,2024-01-02,
";

    #[test]
    fn quality_rows_follow_status_and_column_layout() {
        let ds = parse(WO_CSV).unwrap();
        let rows = quality_rows(&ds);

        assert_eq!(rows.items.len(), 2);
        assert_eq!(
            rows.items[0].cells,
            ["31001", "In Quality", "P-100", "Bracket", "12", "2023-05-01", "1/3"]
        );
        assert_eq!(rows.items[0].class, RowClass::Confident);
        assert_eq!(rows.items[1].cell(quality::STATUS), "Tentative");
        assert_eq!(rows.items[1].class, RowClass::Tentative);
        // in_quality=0 and the trailer are dropped, blank wo_num skipped
        assert_eq!(rows.dropped, 2);
        assert_eq!(rows.skipped, 1);
    }

    #[test]
    fn mrb_rows_filter_on_flag_and_normalize_dates() {
        let ds = parse(WO_CSV).unwrap();
        let rows = mrb_rows(&ds);

        assert_eq!(rows.items.len(), 2);
        assert_eq!(
            rows.items[0].cells,
            ["31002", "P-200", "Housing", "2", "2023-11-30"]
        );
        assert_eq!(rows.items[1].cell(mrb::COMPLETION_DATE), "2024-01-02");
        assert_eq!(rows.skipped, 1);
    }

    #[test]
    fn wip_rows_skip_blank_work_orders() {
        let ds = parse(
            "wo_num,part_num,description,customer,qty_tbr,yield,due,timestamp\n\
             40100,A,Widget,Acme,\"1,200\",10,5,now\n\
             40101,B,Gadget,Beta,30,0,1,\n",
        )
        .unwrap();
        let rows = wip_rows(&ds);
        assert_eq!(rows.items.len(), 2);
        assert_eq!(rows.items[0].cell(wip::OUTSTANDING_QTY), "1,200");
        assert_eq!(rows.items[1].cell(wip::CUSTOMER), "Beta");
        assert_eq!(rows.skipped, 1);
        assert_eq!(rows.missing_fields, 0);
    }

    #[test]
    fn missing_columns_are_counted() {
        let ds = parse("wo_num,part_num\n40100,A").unwrap();
        let rows = wip_rows(&ds);
        assert_eq!(rows.items[0].cells.len(), wip::FIELDS.len());
        assert_eq!(rows.items[0].cell(wip::CUSTOMER), "");
        assert_eq!(rows.missing_fields, 5);
    }

    #[test]
    fn iso_date_variants() {
        assert_eq!(iso_date("2023-11-30T22:15:00Z"), "2023-11-30");
        assert_eq!(iso_date("2023-11-30T22:15:00-05:00"), "2023-12-01");
        assert_eq!(iso_date("2024-01-02 08:00:00"), "2024-01-02");
        assert_eq!(iso_date("2024-01-02"), "2024-01-02");
        assert_eq!(iso_date("1/2/2024"), "2024-01-02");
        assert_eq!(iso_date("soon"), "soon");
    }

    #[test]
    fn only_the_progress_column_sorts_by_expression() {
        let columns = quality_columns();
        assert_eq!(columns.len(), quality::TITLES.len());
        assert_eq!(columns[quality::PROGRESS], Column::expression("Work Order Entry Number"));
        assert_eq!(columns[0], Column::text("Work Order"));
    }
}
