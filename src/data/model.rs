use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A raw cell value, resolved once when rows enter the engine.
///
/// Decoders hand over text; [`CellValue::from_raw`] decides whether that text
/// is a number, so downstream code never re-parses strings ad hoc. Numbers
/// keep the text they were read from: matching, search and export see
/// `"02134"` or `"1.50"` exactly as loaded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "CellRepr", into = "CellRepr")]
pub enum CellValue {
    Number { value: f64, text: String },
    String(String),
    #[default]
    Missing,
}

static MISSING: CellValue = CellValue::Missing;

impl CellValue {
    /// Classify a decoded text cell: empty → `Missing`, finite float → `Number`,
    /// anything else → `String`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Missing;
        }
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number {
                value,
                text: raw.to_string(),
            },
            _ => CellValue::String(raw.to_string()),
        }
    }

    /// A number with its shortest text form.
    pub fn number(value: f64) -> Self {
        CellValue::Number {
            value,
            text: value.to_string(),
        }
    }

    /// Numeric interpretation, `None` for text and missing cells.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Whether the cell is absent or an empty string.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Number { .. } => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number { text, .. } | CellValue::String(text) => f.write_str(text),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(raw: &str) -> Self {
        CellValue::from_raw(raw)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::number(v)
    }
}

/// Wire form: numbers as JSON numbers, text as strings, missing as `null`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Number(f64),
    String(String),
    Missing,
}

impl From<CellRepr> for CellValue {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Number(v) => CellValue::number(v),
            CellRepr::String(s) => CellValue::String(s),
            CellRepr::Missing => CellValue::Missing,
        }
    }
}

impl From<CellValue> for CellRepr {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Number { value, .. } => CellRepr::Number(value),
            CellValue::String(s) => CellRepr::String(s),
            CellValue::Missing => CellRepr::Missing,
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one record
// ---------------------------------------------------------------------------

/// One record: column name → value. Absent columns read as `Missing`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&MISSING)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// The full loaded table. Replaced wholesale on a new upload, never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: u64,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset with an explicit column order. Duplicate names are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut seen = HashSet::new();
        let columns = columns
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        Dataset {
            id: NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed),
            columns,
            rows,
        }
    }

    /// Build a dataset whose column list is the first-seen order of keys
    /// across `rows`, given each row's key order in `key_order`.
    pub fn from_keyed_rows(rows: Vec<(Vec<String>, Row)>) -> Self {
        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .map(|(keys, row)| {
                for k in keys {
                    if seen.insert(k.clone()) {
                        columns.push(k);
                    }
                }
                row
            })
            .collect();
        Dataset::new(columns, rows)
    }

    /// Identity of this load, used as a memoization key.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows at `indices`, in that order.
    pub fn select<'a>(&'a self, indices: &[usize]) -> Vec<&'a Row> {
        indices.iter().filter_map(|&i| self.rows.get(i)).collect()
    }

    /// First-seen distinct stringified values of `column`, at most `limit`.
    /// Number of `size`-row pages; zero for an empty dataset.
    pub fn page_count(&self, size: usize) -> usize {
        self.rows.len().div_ceil(size.max(1))
    }

    /// Rows of page `page` (zero-based); empty past the last page.
    pub fn page(&self, page: usize, size: usize) -> &[Row] {
        let size = size.max(1);
        let start = page.saturating_mul(size).min(self.rows.len());
        let end = start.saturating_add(size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn unique_values(&self, column: &str, limit: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if out.len() >= limit {
                break;
            }
            let s = row.get(column).to_string();
            if seen.insert(s.clone()) {
                out.push(s);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_classifies_text() {
        assert_eq!(CellValue::from_raw(""), CellValue::Missing);
        assert_eq!(CellValue::from_raw("10"), CellValue::number(10.0));
        assert_eq!(CellValue::from_raw(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(CellValue::from_raw("-1e3").as_number(), Some(-1000.0));
        assert_eq!(CellValue::from_raw("NaN"), CellValue::String("NaN".into()));
        assert_eq!(CellValue::from_raw("inf"), CellValue::String("inf".into()));
        assert_eq!(CellValue::from_raw("abc"), CellValue::String("abc".into()));
    }

    #[test]
    fn display_drops_integer_fraction() {
        assert_eq!(CellValue::number(15.0).to_string(), "15");
        assert_eq!(CellValue::number(1.25).to_string(), "1.25");
        assert_eq!(CellValue::Missing.to_string(), "");
    }

    #[test]
    fn numbers_keep_their_source_text() {
        let zip = CellValue::from_raw("02134");
        assert_eq!(zip.as_number(), Some(2134.0));
        assert_eq!(zip.to_string(), "02134");
        let price = CellValue::from_raw("1.50");
        assert_eq!(price.as_number(), Some(1.5));
        assert_eq!(price.to_string(), "1.50");
        assert_eq!(CellValue::from_raw("-1e3").to_string(), "-1e3");
    }

    #[test]
    fn serializes_numbers_as_json_numbers() {
        let row: Row = [("zip", "02134"), ("name", "x"), ("gap", "")].into_iter().collect();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"gap":null,"name":"x","zip":2134.0}"#);
        let back: Row = serde_json::from_str(r#"{"n": 3, "s": "3"}"#).unwrap();
        assert_eq!(back.get("n"), &CellValue::number(3.0));
        assert_eq!(back.get("s"), &CellValue::String("3".into()));
    }

    #[test]
    fn absent_column_reads_missing() {
        let row: Row = [("a", "1")].into_iter().collect();
        assert_eq!(row.get("a"), &CellValue::number(1.0));
        assert!(row.get("b").is_missing());
    }

    #[test]
    fn columns_follow_first_seen_order() {
        let r1: Row = [("b", "1"), ("a", "x")].into_iter().collect();
        let r2: Row = [("c", "2")].into_iter().collect();
        let ds = Dataset::from_keyed_rows(vec![
            (vec!["b".into(), "a".into()], r1),
            (vec!["c".into(), "b".into()], r2),
        ]);
        assert_eq!(ds.columns(), ["b", "a", "c"]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn duplicate_columns_are_dropped() {
        let ds = Dataset::new(vec!["a".into(), "b".into(), "a".into()], vec![]);
        assert_eq!(ds.columns(), ["a", "b"]);
        assert!(ds.is_empty());
    }

    #[test]
    fn unique_values_are_capped() {
        let rows = (0..30)
            .map(|i| [("n", CellValue::number(f64::from(i % 25)))].into_iter().collect())
            .collect();
        let ds = Dataset::new(vec!["n".into()], rows);
        let vals = ds.unique_values("n", 20);
        assert_eq!(vals.len(), 20);
        assert_eq!(vals[0], "0");
        assert_eq!(vals[19], "19");
    }

    #[test]
    fn pages_split_rows_in_order() {
        let rows = (0..23)
            .map(|i| [("n", CellValue::number(f64::from(i)))].into_iter().collect())
            .collect();
        let ds = Dataset::new(vec!["n".into()], rows);
        assert_eq!(ds.page_count(10), 3);
        assert_eq!(ds.page(0, 10).len(), 10);
        assert_eq!(ds.page(2, 10).len(), 3);
        assert_eq!(ds.page(2, 10)[0].get("n").to_string(), "20");
        assert!(ds.page(3, 10).is_empty());
        assert_eq!(Dataset::new(vec![], vec![]).page_count(10), 0);
    }

    #[test]
    fn every_dataset_gets_a_fresh_id() {
        let a = Dataset::new(vec![], vec![]);
        let b = Dataset::new(vec![], vec![]);
        assert_ne!(a.id(), b.id());
    }
}
