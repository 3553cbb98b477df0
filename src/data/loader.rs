use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!(
        "loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse CSV text with a header row. Every record must match the header width.
pub fn parse_csv(text: &str) -> Result<Dataset> {
    read_csv(csv::Reader::from_reader(text.as_bytes()))
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.into_records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, value)| (h.as_str(), CellValue::from_raw(value)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "region": "North", "units": 12, "price": "3.50" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse a JSON array of flat objects. Columns follow first-seen key order.
pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut keyed = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let keys: Vec<String> = obj.keys().cloned().collect();
        let row: Row = obj
            .iter()
            .map(|(key, val)| (key.as_str(), json_to_cell(val)))
            .collect();
        keyed.push((keys, row));
    }

    Ok(Dataset::from_keyed_rows(keyed))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::from_raw(s),
        JsonValue::Number(n) => match n.as_f64() {
            Some(value) if value.is_finite() => CellValue::Number {
                value,
                text: n.to_string(),
            },
            _ => CellValue::String(n.to_string()),
        },
        JsonValue::Bool(b) => CellValue::String(b.to_string()),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file as flat rows.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Strings, floats and booleans are read
/// directly; every other type goes through Arrow's display formatting, so
/// integers and decimals stay numeric while dates, timestamps and nested
/// values become text.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let record: Row = columns
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.as_str(), extract_cell(col, row)))
                .collect();
            rows.push(record);
        }
    }

    Ok(Dataset::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Missing;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::from_raw(s.value(row)))
            .unwrap_or_default(),
        DataType::LargeUtf8 => CellValue::from_raw(col.as_string::<i64>().value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| {
                let v = a.value(row);
                float_cell(f64::from(v), v.to_string())
            })
            .unwrap_or_default(),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| {
                let v = a.value(row);
                float_cell(v, v.to_string())
            })
            .unwrap_or_default(),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::String(a.value(row).to_string()))
            .unwrap_or_default(),
        _ => match array_value_to_string(col.as_ref(), row) {
            Ok(text) => CellValue::from_raw(&text),
            Err(e) => {
                log::debug!("unformattable {} cell at row {row}: {e}", col.data_type());
                CellValue::Missing
            }
        },
    }
}

/// Non-finite floats (NaN, ±inf) carry no usable value.
fn float_cell(value: f64, text: String) -> CellValue {
    if value.is_finite() {
        CellValue::Number { value, text }
    } else {
        CellValue::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int16Array, Int64Array, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_keeps_header_order_and_classifies_cells() {
        let ds = parse_csv("zone,count,note\nN,3,\"a, b\"\nS,,x\n").unwrap();
        assert_eq!(ds.columns(), ["zone", "count", "note"]);
        assert_eq!(ds.rows()[0].get("count"), &CellValue::number(3.0));
        assert_eq!(ds.rows()[0].get("note"), &CellValue::String("a, b".into()));
        assert!(ds.rows()[1].get("count").is_missing());
    }

    #[test]
    fn csv_ragged_record_is_an_error() {
        let err = parse_csv("a,b\n1,2\n3\n").unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"));
    }

    #[test]
    fn json_records_union_keys_in_first_seen_order() {
        let ds = parse_json(r#"[{"b": 1, "a": "x"}, {"c": null, "b": "2.5", "flag": true}]"#).unwrap();
        assert_eq!(ds.columns(), ["b", "a", "c", "flag"]);
        assert_eq!(ds.rows()[1].get("b"), &CellValue::number(2.5));
        assert!(ds.rows()[1].get("c").is_missing());
        assert!(ds.rows()[1].get("a").is_missing());
        assert_eq!(ds.rows()[1].get("flag").to_string(), "true");
    }

    #[test]
    fn json_rejects_non_array() {
        assert!(parse_json(r#"{"a": 1}"#).is_err());
        assert!(parse_json("[1, 2]").is_err());
    }

    #[test]
    fn unknown_extension_fails() {
        let err = load_file(Path::new("table.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    fn write_parquet(path: &Path, schema: Arc<Schema>, columns: Vec<Arc<dyn Array>>) {
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_flat_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, true),
            Field::new("qty", DataType::Int64, false),
            Field::new("score", DataType::Float64, true),
        ]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");
        write_parquet(
            &path,
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("a"), None])),
                Arc::new(Int64Array::from(vec![4, 7])),
                Arc::new(Float64Array::from(vec![Some(0.5), None])),
            ],
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns(), ["name", "qty", "score"]);
        assert_eq!(ds.rows()[1].get("qty"), &CellValue::number(7.0));
        assert!(ds.rows()[1].get("name").is_missing());
        assert!(ds.rows()[1].get("score").is_missing());
        assert_eq!(ds.rows()[0].get("score"), &CellValue::number(0.5));
    }

    #[test]
    fn parquet_other_types_use_display_text() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("qty", DataType::Int16, false),
            Field::new("ts", DataType::Timestamp(TimeUnit::Millisecond, None), true),
        ]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.parquet");
        write_parquet(
            &path,
            schema,
            vec![
                Arc::new(Int16Array::from(vec![4, 7])),
                Arc::new(TimestampMillisecondArray::from(vec![Some(0), None])),
            ],
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.rows()[0].get("qty"), &CellValue::number(4.0));
        assert_eq!(ds.rows()[1].get("qty").as_number(), Some(7.0));
        let ts = ds.rows()[0].get("ts").to_string();
        assert!(ts.starts_with("1970-01-01"), "{ts}");
        assert!(ds.rows()[0].get("ts").as_number().is_none());
        assert!(ds.rows()[1].get("ts").is_missing());
    }

    #[test]
    fn numeric_text_survives_loading() {
        let ds = parse_csv("zip,price\n02134,1.50\n").unwrap();
        assert_eq!(ds.rows()[0].get("zip").to_string(), "02134");
        assert_eq!(ds.rows()[0].get("price").as_number(), Some(1.5));

        let ds = parse_json(r#"[{"n": 2.50e1, "s": "007"}]"#).unwrap();
        assert_eq!(ds.rows()[0].get("n").as_number(), Some(25.0));
        assert_eq!(ds.rows()[0].get("s").to_string(), "007");
    }
}
