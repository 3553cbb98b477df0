use std::borrow::Borrow;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};

use super::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Header line then one line per row. Fields containing a delimiter, quote or
/// newline are quoted with inner quotes doubled; missing cells are empty.
pub fn to_csv_string<R: Borrow<Row>>(rows: &[R], columns: &[String]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(columns).context("writing CSV header")?;
    for (i, row) in rows.iter().enumerate() {
        let row = row.borrow();
        writer
            .write_record(columns.iter().map(|c| row.get(c).to_string()))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    let bytes = writer.into_inner().context("flushing CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

pub fn write_csv<R: Borrow<Row>>(path: &Path, rows: &[R], columns: &[String]) -> Result<()> {
    let text = to_csv_string(rows, columns)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Numbers whose source text is already canonical JSON are written as
/// numbers; any other spelling (`007`, `1.50`, `1e3`) is kept as a string.
fn cell_to_json(cell: &CellValue) -> JsonValue {
    match cell {
        CellValue::Number { text, .. } => match serde_json::from_str::<serde_json::Number>(text) {
            Ok(n) if n.to_string() == *text => JsonValue::Number(n),
            _ => JsonValue::String(text.clone()),
        },
        CellValue::String(s) => JsonValue::String(s.clone()),
        CellValue::Missing => JsonValue::Null,
    }
}

/// Pretty JSON array of objects, keys in column order.
pub fn to_json_string<R: Borrow<Row>>(rows: &[R], columns: &[String]) -> Result<String> {
    let records: Vec<JsonValue> = rows
        .iter()
        .map(|row| {
            let row = row.borrow();
            let object: Map<String, JsonValue> = columns
                .iter()
                .map(|c| (c.clone(), cell_to_json(row.get(c))))
                .collect();
            JsonValue::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&records).context("serializing rows to JSON")
}

pub fn write_json<R: Borrow<Row>>(path: &Path, rows: &[R], columns: &[String]) -> Result<()> {
    let text = to_json_string(rows, columns)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
