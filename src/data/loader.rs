use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::error::{Result, ZtError};

use super::model::Table;
use super::schema::TableSchema;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by numeric rows (the usual case)
/// * `.json`    – `[{ "n": 1e18, "t": 300.0, ... }, ...]`
/// * `.parquet` – numeric columns (Float64 / Float32 / Int64 / Int32)
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" | "" => load_csv(path),
        other => Err(ZtError::InvalidArgument(format!(
            "unsupported file extension: .{other}"
        ))),
    }?;

    debug!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}

/// Load a table, translate its headers and validate them against `schema`.
pub fn read_validate(path: &Path, schema: &TableSchema) -> Result<Table> {
    let mut table = load_file(path)?;
    schema.apply(&mut table)?;
    Ok(table)
}

/// Write a table as CSV with a header row.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;

    let columns = table
        .column_names()
        .iter()
        .map(|c| table.column(c))
        .collect::<Result<Vec<_>>>()?;

    for row in 0..table.len() {
        writer.write_record(columns.iter().map(|col| col[row].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read digitised experimental data: a header-less, two-column CSV of (x, y).
pub fn read_expt_xy_csv(path: &Path) -> Result<Vec<(f64, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut points = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != 2 {
            return Err(ZtError::DataShape(format!(
                "{}: row {row_no} has {} fields, expected 2",
                path.display(),
                record.len()
            )));
        }
        let x = parse_float(&record[0], row_no, "x")?;
        let y = parse_float(&record[1], row_no, "y")?;
        points.push((x, y));
    }
    Ok(points)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every cell numeric.
/// Empty cells are read as NaN. Repeated headers are numbered, see
/// [`dedupe_headers`].
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = dedupe_headers(reader.headers()?.iter().map(|h| h.to_string()).collect());

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(ZtError::DataShape(format!(
                "CSV row {row_no} has {} fields but the header has {}",
                record.len(),
                headers.len()
            )));
        }
        for (col_idx, value) in record.iter().enumerate() {
            columns[col_idx].push(parse_float(value, row_no, &headers[col_idx])?);
        }
    }

    Table::from_columns(headers.into_iter().zip(columns).collect())
}

/// AMSET writes its mobility breakdown as `ADP,ADP,ADP,ADP`. The k-th repeat
/// of a header becomes `{name}.{k}`, skipping names already taken.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = headers.iter().cloned().collect();
    let mut first_seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for header in headers {
        if first_seen.insert(header.clone()) {
            out.push(header);
            continue;
        }
        let k = repeats.entry(header.clone()).or_insert(0);
        let name = loop {
            *k += 1;
            let candidate = format!("{header}.{k}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        debug!("renamed repeated CSV header '{header}' to '{name}'");
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

fn parse_float(s: &str, row: usize, col: &str) -> Result<f64> {
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|_| {
        ZtError::Schema(format!("row {row}, column '{col}': '{s}' is not a number"))
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "n": 1.0e18, "t": 300.0, "sigma_ave": 12.5 },
///   ...
/// ]
/// ```
///
/// Columns are taken from the first record's keys; `null` becomes NaN.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| ZtError::Schema("expected top-level JSON array".to_string()))?;

    let Some(first) = records.first() else {
        return Ok(Table::new());
    };
    let headers: Vec<String> = json_object(first, 0)?.keys().cloned().collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(records.len()); headers.len()];

    for (i, rec) in records.iter().enumerate() {
        let obj = json_object(rec, i)?;
        if obj.len() != headers.len() {
            return Err(ZtError::DataShape(format!(
                "record {i} has {} fields, expected {}",
                obj.len(),
                headers.len()
            )));
        }
        for (col, name) in headers.iter().enumerate() {
            let value = match obj.get(name) {
                Some(JsonValue::Null) => f64::NAN,
                Some(v) => v.as_f64().ok_or_else(|| {
                    ZtError::Schema(format!("record {i}, column '{name}': not a number"))
                })?,
                None => {
                    return Err(ZtError::Schema(format!(
                        "record {i}: missing column '{name}'"
                    )))
                }
            };
            columns[col].push(value);
        }
    }

    Table::from_columns(headers.into_iter().zip(columns).collect())
}

fn json_object(val: &JsonValue, row: usize) -> Result<&serde_json::Map<String, JsonValue>> {
    val.as_object()
        .ok_or_else(|| ZtError::Schema(format!("record {row} is not a JSON object")))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns are all numeric.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nulls become NaN.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut headers: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        if headers.is_empty() {
            headers = schema.fields().iter().map(|f| f.name().clone()).collect();
            columns = vec![Vec::new(); headers.len()];
        }

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let values = extract_f64_column(batch.column(col_idx))
                .map_err(|e| ZtError::Schema(format!("column '{}': {e}", field.name())))?;
            columns[col_idx].extend(values);
        }
    }

    Table::from_columns(headers.into_iter().zip(columns).collect())
}

/// Extract a numeric Arrow column as `Vec<f64>`.
fn extract_f64_column(col: &Arc<dyn Array>) -> std::result::Result<Vec<f64>, String> {
    let any = col.as_any();
    let values = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(any)?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => downcast::<Float32Array>(any)?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int64 => downcast::<Int64Array>(any)?
            .iter()
            .map(|v| v.map_or(f64::NAN, |i| i as f64))
            .collect(),
        DataType::Int32 => downcast::<Int32Array>(any)?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        other => return Err(format!("expected a numeric column, got {other:?}")),
    };
    Ok(values)
}

fn downcast<T: 'static>(any: &dyn std::any::Any) -> std::result::Result<&T, String> {
    any.downcast_ref::<T>()
        .ok_or_else(|| format!("unexpected array type {}", std::any::type_name::<T>()))
}
