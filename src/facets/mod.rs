//! Facet construction for the grid search panes.
//!
//! Every builder is a pure function of the full [`Dataset`]: it returns the
//! ordered option list for one pane and shares no state with other builders.
//! Predicates address the *rendered* row by column position, so each builder
//! takes the target column index used by the page's column layout.
//!
//! Predicates are plain data ([`Predicate`]) rather than closures. The same
//! value is evaluated here to compute pane counts and serialized into the
//! page, where the grid widget turns it back into an option callback.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use crate::dataset::{Dataset, Record};
use crate::grid::GridRow;

/// Width of one work-order range bucket.
pub const RANGE_WIDTH: i64 = 1000;

/// Upper bound on generated range buckets; a corrupt endpoint must not
/// produce millions of options.
const MAX_RANGE_BUCKETS: usize = 10_000;

/// Label of the year-pane option matching rows without a confirmation date.
pub const NO_COMPLETION_CONFIRMATION: &str = "No Completion Confirmation";

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A row test evaluated against one positional column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Numeric cell value in `[start, end)`.
    Range { column: usize, start: i64, end: i64 },
    /// Cell equals `value` exactly.
    Equals { column: usize, value: String },
    /// Cell contains `needle` as a substring.
    Contains { column: usize, needle: String },
    /// Numeric cell value (commas stripped) strictly greater than `threshold`.
    /// A non-numeric threshold matches nothing.
    GreaterThan {
        column: usize,
        threshold: Option<f64>,
    },
}

impl Predicate {
    pub fn column(&self) -> usize {
        match self {
            Self::Range { column, .. }
            | Self::Equals { column, .. }
            | Self::Contains { column, .. }
            | Self::GreaterThan { column, .. } => *column,
        }
    }

    /// Evaluate against a rendered row's cells. Out-of-range columns never match.
    pub fn matches(&self, cells: &[String]) -> bool {
        let Some(cell) = cells.get(self.column()) else {
            return false;
        };

        match self {
            Self::Range { start, end, .. } => {
                numeric(cell).is_some_and(|v| v >= *start as f64 && v < *end as f64)
            }
            Self::Equals { value, .. } => cell == value,
            Self::Contains { needle, .. } => cell.contains(needle.as_str()),
            Self::GreaterThan { threshold, .. } => match (numeric_qty(cell), threshold) {
                (Some(v), Some(t)) => v > *t,
                _ => false,
            },
        }
    }
}

/// Numeric reading of a cell: surrounding whitespace ignored, empty reads
/// as zero, anything else unparseable is `None`.
pub fn numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric reading of a quantity with thousands separators (`"1,200"`).
pub fn numeric_qty(raw: &str) -> Option<f64> {
    numeric(&raw.replace(',', ""))
}

// ---------------------------------------------------------------------------
// Options and panes
// ---------------------------------------------------------------------------

/// One selectable entry in a search pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetOption {
    pub label: String,
    pub predicate: Predicate,
}

impl FacetOption {
    pub fn new(label: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            label: label.into(),
            predicate,
        }
    }
}

/// A search pane bound to one grid column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetPane {
    pub header: String,
    pub column: usize,
    pub options: Vec<FacetOption>,
    /// Rows matching each option, parallel to `options`. Zero until
    /// [`FacetPane::rebuild`] runs against the drawn rows.
    pub counts: Vec<usize>,
}

impl FacetPane {
    pub fn new(header: impl Into<String>, column: usize, options: Vec<FacetOption>) -> Self {
        let counts = vec![0; options.len()];
        Self {
            header: header.into(),
            column,
            options,
            counts,
        }
    }

    /// Recompute per-option match counts.
    pub fn rebuild(&mut self, rows: &[GridRow]) {
        self.counts = self
            .options
            .iter()
            .map(|opt| {
                rows.iter()
                    .filter(|row| opt.predicate.matches(&row.cells))
                    .count()
            })
            .collect();
    }

    /// Options paired with their current counts.
    pub fn entries(&self) -> impl Iterator<Item = (&FacetOption, usize)> {
        self.options.iter().zip(self.counts.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// 1000-wide numeric range buckets over `field`.
///
/// `min` comes from the first record and `max` from the record before the
/// trailer, each floored to the bucket width. Buckets run from `min` to
/// `max` inclusive. Fewer than two records, or an endpoint that is
/// non-numeric or out of `i64` range, yields no buckets.
pub fn range_facets(dataset: &Dataset, field: &str, column: usize) -> Vec<FacetOption> {
    let (Some(first), Some(last)) = (dataset.first(), dataset.second_to_last()) else {
        return Vec::new();
    };
    let (Some(lo), Some(hi)) = (numeric(first.value(field)), numeric(last.value(field))) else {
        return Vec::new();
    };

    let (Some(min), Some(max)) = (floor_to_bucket(lo), floor_to_bucket(hi)) else {
        return Vec::new();
    };

    std::iter::successors(Some(min), |start| start.checked_add(RANGE_WIDTH))
        .take_while(|start| *start <= max)
        .take(MAX_RANGE_BUCKETS)
        .map_while(|start| {
            let end = start.checked_add(RANGE_WIDTH)?;
            Some(FacetOption::new(
                start.to_string(),
                Predicate::Range { column, start, end },
            ))
        })
        .collect()
}

/// Bucket start for `value`, or `None` when it does not fit an `i64`.
fn floor_to_bucket(value: f64) -> Option<i64> {
    let bucket = (value / RANGE_WIDTH as f64).floor();
    if !bucket.is_finite() || bucket.abs() >= (i64::MAX / RANGE_WIDTH) as f64 {
        return None;
    }
    (bucket as i64).checked_mul(RANGE_WIDTH)
}

/// One equality option per distinct `field` value, in first-occurrence order.
///
/// Scans every record before the trailer whose `key` field is non-empty.
pub fn distinct_facets(dataset: &Dataset, key: &str, field: &str, column: usize) -> Vec<FacetOption> {
    distinct_values(dataset, key, field)
        .into_iter()
        .map(|value| {
            FacetOption::new(
                value,
                Predicate::Equals {
                    column,
                    value: value.to_string(),
                },
            )
        })
        .collect()
}

/// One "greater than" option per distinct `field` value.
///
/// Selecting the option shows rows whose numeric value exceeds it.
pub fn threshold_facets(
    dataset: &Dataset,
    key: &str,
    field: &str,
    column: usize,
) -> Vec<FacetOption> {
    distinct_values(dataset, key, field)
        .into_iter()
        .map(|value| {
            FacetOption::new(
                value,
                Predicate::GreaterThan {
                    column,
                    threshold: numeric_qty(value),
                },
            )
        })
        .collect()
}

/// Completion-confirmation year options for a date `field`.
///
/// The first option matches the literal "No Completion Confirmation" cell;
/// the rest are one substring option per distinct four-digit year, in
/// first-occurrence order.
pub fn year_facets(dataset: &Dataset, key: &str, field: &str, column: usize) -> Vec<FacetOption> {
    year_facets_by(dataset, key, field, column, str::to_string)
}

/// Like [`year_facets`], but reads years from `render(value)`, the text the
/// grid actually shows in `column`.
pub fn year_facets_by(
    dataset: &Dataset,
    key: &str,
    field: &str,
    column: usize,
    render: impl Fn(&str) -> String,
) -> Vec<FacetOption> {
    let mut options = vec![FacetOption::new(
        NO_COMPLETION_CONFIRMATION,
        Predicate::Equals {
            column,
            value: NO_COMPLETION_CONFIRMATION.to_string(),
        },
    )];

    let mut seen = HashSet::new();
    for record in scanned(dataset, key) {
        let shown = render(record.value(field));
        if let Some(year) = extract_year(&shown)
            && seen.insert(year.to_string())
        {
            options.push(FacetOption::new(
                year,
                Predicate::Contains {
                    column,
                    needle: year.to_string(),
                },
            ));
        }
    }

    options
}

/// Fixed equality options over a known label set.
pub fn fixed_facets(labels: &[&str], column: usize) -> Vec<FacetOption> {
    labels
        .iter()
        .map(|label| {
            FacetOption::new(
                *label,
                Predicate::Equals {
                    column,
                    value: label.to_string(),
                },
            )
        })
        .collect()
}

/// Records considered by distinct scans: trailer excluded, blank keys skipped.
fn scanned<'a>(dataset: &'a Dataset, key: &'a str) -> impl Iterator<Item = &'a Record> {
    dataset
        .without_trailer()
        .iter()
        .filter(move |r| !r.is_blank(key))
}

fn distinct_values<'a>(dataset: &'a Dataset, key: &'a str, field: &'a str) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    scanned(dataset, key)
        .map(|r| r.value(field))
        .filter(|v| seen.insert(*v))
        .collect()
}

/// First four-digit 19xx/20xx year in a date string.
fn extract_year(raw: &str) -> Option<&str> {
    static YEAR: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    let re = YEAR
        .get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").ok())
        .as_ref()?;
    re.find(raw).map(|m| m.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse;
    use crate::grid::{GridRow, RowClass};

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn range_scenario_excludes_trailer() {
        let ds = parse("wo_num\n1050\n2075\n").unwrap();
        let labels: Vec<_> = range_facets(&ds, "wo_num", 0)
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, ["1000", "2000"]);
    }

    #[test]
    fn range_buckets_are_contiguous() {
        let ds = parse("wo_num\n31999\n30500\n35020\n\n").unwrap();
        // first = 31999 → 31000, second-to-last = 35020 → 35000
        let facets = range_facets(&ds, "wo_num", 0);
        assert_eq!(facets.len(), 5);
        for pair in facets.windows(2) {
            let (Predicate::Range { end, .. }, Predicate::Range { start, .. }) =
                (&pair[0].predicate, &pair[1].predicate)
            else {
                panic!("expected range predicates");
            };
            assert_eq!(end, start);
        }
        assert_eq!(facets[0].label, "31000");
        assert_eq!(facets[4].label, "35000");
    }

    #[test]
    fn out_of_range_endpoints_yield_no_buckets() {
        assert!(range_facets(&parse("wo_num\n1e30\n2e30\n").unwrap(), "wo_num", 0).is_empty());
        assert!(range_facets(&parse("wo_num\n-1e30\n1050\n").unwrap(), "wo_num", 0).is_empty());
        assert_eq!(floor_to_bucket(9.3e18), None);
        assert_eq!(floor_to_bucket(-2500.0), Some(-3000));
    }

    #[test]
    fn range_requires_two_records_and_numeric_endpoints() {
        assert!(range_facets(&parse("wo_num\n1050").unwrap(), "wo_num", 0).is_empty());
        assert!(range_facets(&parse("wo_num\nabc\n2000\n").unwrap(), "wo_num", 0).is_empty());
        // Descending endpoints produce nothing
        assert!(range_facets(&parse("wo_num\n5000\n1000\n").unwrap(), "wo_num", 0).is_empty());
    }

    #[test]
    fn range_predicate_is_half_open() {
        let p = Predicate::Range {
            column: 0,
            start: 1000,
            end: 2000,
        };
        assert!(p.matches(&cells(&["1000"])));
        assert!(p.matches(&cells(&["1999"])));
        assert!(!p.matches(&cells(&["2000"])));
        assert!(!p.matches(&cells(&["WO-1500"])));
        assert!(!p.matches(&[]));
    }

    #[test]
    fn distinct_facets_keep_first_occurrence_order() {
        let ds = parse("wo_num,customer\n1,Beta\n2,Acme\n3,Beta\n,Ghost\n4,Zed\n").unwrap();
        let labels: Vec<_> = distinct_facets(&ds, "wo_num", "customer", 3)
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, ["Beta", "Acme", "Zed"]);
    }

    #[test]
    fn threshold_facets_compare_numerically() {
        let ds = parse("wo_num,qty_tbr\n1,\"1,200\"\n2,50\n3,50\n").unwrap();
        let facets = threshold_facets(&ds, "wo_num", "qty_tbr", 4);
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].label, "1,200");

        let row = cells(&["1", "p", "d", "c", "1,500"]);
        assert!(facets[0].predicate.matches(&row));
        assert!(facets[1].predicate.matches(&row));
        let small = cells(&["1", "p", "d", "c", "50"]);
        assert!(!facets[1].predicate.matches(&small));
    }

    #[test]
    fn non_numeric_threshold_matches_nothing() {
        let p = Predicate::GreaterThan {
            column: 0,
            threshold: numeric_qty("n/a"),
        };
        assert!(!p.matches(&cells(&["10"])));
    }

    #[test]
    fn year_facets_start_with_no_confirmation() {
        let ds = parse(
            "wo_num,date\n1,2023-04-02\n2,No Completion Confirmation\n3,11/30/2021\n4,2023-06-01\n",
        )
        .unwrap();
        let facets = year_facets(&ds, "wo_num", "date", 5);
        let labels: Vec<_> = facets.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, [NO_COMPLETION_CONFIRMATION, "2023", "2021"]);

        let row = cells(&["", "", "", "", "", "2021-01-05"]);
        assert!(facets[2].predicate.matches(&row));
        assert!(!facets[1].predicate.matches(&row));
    }

    #[test]
    fn pane_rebuild_counts_matches() {
        let mut pane = FacetPane::new("Status", 1, fixed_facets(&["In Quality", "Tentative"], 1));
        assert_eq!(pane.counts, [0, 0]);

        let rows = vec![
            GridRow::new(cells(&["1", "In Quality"]), RowClass::Confident),
            GridRow::new(cells(&["2", "Tentative"]), RowClass::Tentative),
            GridRow::new(cells(&["3", "In Quality"]), RowClass::Confident),
        ];
        pane.rebuild(&rows);
        assert_eq!(pane.counts, [2, 1]);
    }

    #[test]
    fn predicates_serialize_with_kind_tag() {
        let p = Predicate::Contains {
            column: 5,
            needle: "2024".to_string(),
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"kind":"contains","column":5,"needle":"2024"}"#);
    }
}
