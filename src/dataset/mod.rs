//! CSV snapshot ingestion.
//!
//! A snapshot is parsed header-first into an ordered [`Dataset`] of
//! [`Record`]s. Rows are read with `flexible` parsing: a short row simply
//! lacks the trailing keys instead of failing the whole document.
//!
//! The exporters that produce the snapshots end every file with a line
//! terminator, and downstream facet code treats the resulting blank final
//! record as a trailer. [`parse`] reproduces that trailer explicitly so the
//! `len - 2` convention holds regardless of the CSV reader's blank-line
//! handling.

use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One CSV row: column name → raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// A record with every header present and empty.
    fn blank(headers: &[String]) -> Self {
        Self::from_pairs(headers.iter().map(|h| (h.as_str(), "")))
    }

    /// Raw value for `key`, or `None` if the row did not carry that column.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Raw value for `key`, reading a missing column as empty.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// True when `key` is missing or empty.
    pub fn is_blank(&self, key: &str) -> bool {
        self.value(key).is_empty()
    }

    /// True when every cell is empty, as in the trailer row.
    pub fn is_empty_row(&self) -> bool {
        self.fields.values().all(String::is_empty)
    }

    /// Number of `keys` this record does not carry at all.
    pub fn count_missing(&self, keys: &[&str]) -> usize {
        keys.iter().filter(|k| !self.fields.contains_key(**k)).count()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// An ordered sequence of records, loaded whole for one render cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    /// Build a dataset from records alone (headers left empty).
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            headers: Vec::new(),
            records,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// The last record before the trailer (`records[len - 2]`).
    pub fn second_to_last(&self) -> Option<&Record> {
        self.records.len().checked_sub(2).map(|i| &self.records[i])
    }

    /// Every record except the trailer. A document without a final line
    /// terminator has no trailer, so its last record is kept.
    pub fn without_trailer(&self) -> &[Record] {
        match self.records.split_last() {
            Some((last, rest)) if last.is_empty_row() => rest,
            _ => &self.records,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a CSV document whose first row is the header.
///
/// Cells are kept verbatim (no trimming, no type coercion). A document that
/// ends with a line terminator gets a blank trailer record appended.
pub fn parse(text: &str) -> Result<Dataset, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        records.push(Record { fields });
    }

    if !headers.is_empty() && ends_with_terminator(text) {
        records.push(Record::blank(&headers));
    }

    Ok(Dataset { headers, records })
}

fn ends_with_terminator(text: &str) -> bool {
    text.ends_with('\n') || text.ends_with('\r')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows_in_order() {
        let ds = parse("wo_num,part_num\n1050,A-1\n2075,B-2").unwrap();
        assert_eq!(ds.headers(), ["wo_num", "part_num"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].value("wo_num"), "1050");
        assert_eq!(ds.records()[1].value("part_num"), "B-2");
    }

    #[test]
    fn trailing_newline_yields_blank_trailer() {
        let ds = parse("wo_num,part_num\n1050,A-1\n2075,B-2\n").unwrap();
        assert_eq!(ds.len(), 3);
        let trailer = &ds.records()[2];
        assert_eq!(trailer.get("wo_num"), Some(""));
        assert!(trailer.is_blank("part_num"));
        assert_eq!(ds.second_to_last().unwrap().value("wo_num"), "2075");
        assert_eq!(ds.without_trailer().len(), 2);
    }

    #[test]
    fn missing_final_newline_keeps_last_record() {
        let ds = parse("wo_num,part_num\n1050,A-1\n2075,B-2").unwrap();
        assert_eq!(ds.len(), 2);
        let scanned: Vec<&str> = ds.without_trailer().iter().map(|r| r.value("wo_num")).collect();
        assert_eq!(scanned, ["1050", "2075"]);
    }

    #[test]
    fn crlf_documents_parse() {
        let ds = parse("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].value("b"), "2");
    }

    #[test]
    fn short_rows_lack_trailing_keys() {
        let ds = parse("a,b,c\n1,2\n").unwrap();
        let first = &ds.records()[0];
        assert_eq!(first.get("b"), Some("2"));
        assert_eq!(first.get("c"), None);
        assert_eq!(first.value("c"), "");
        assert_eq!(first.count_missing(&["a", "b", "c"]), 1);
    }

    #[test]
    fn quoted_values_keep_commas() {
        let ds = parse("qty_tbr,customer\n\"1,200\",\"Acme, Inc.\"\n").unwrap();
        assert_eq!(ds.records()[0].value("qty_tbr"), "1,200");
        assert_eq!(ds.records()[0].value("customer"), "Acme, Inc.");
    }

    #[test]
    fn empty_document_is_empty_dataset() {
        let ds = parse("").unwrap();
        assert!(ds.is_empty());
        assert!(ds.first().is_none());
        assert!(ds.second_to_last().is_none());
        assert!(ds.without_trailer().is_empty());
    }
}
