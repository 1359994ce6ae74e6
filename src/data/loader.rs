use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::dates::parse_mixed_date;
use super::error::{PipelineError, PipelineResult};
use super::model::{Dataset, Dimension, Measure, Record, ORDER_DATE, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one transaction per line (UTF-8 or Latin-1)
/// * `.json`    – `[{ "Order Date": "...", "Region": "...", ... }, ...]`
/// * `.parquet` – one column per field, any scalar Arrow type
pub fn load_file(path: &Path) -> PipelineResult<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv_reader(std::fs::File::open(path)?),
        "json" => load_json_str(&std::fs::read_to_string(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(PipelineError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.column_names
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RawTable – every format is first flattened into text cells
// ---------------------------------------------------------------------------

/// Untyped text table produced by each format reader.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Validate columns and convert every row into a typed [`Record`].
    fn into_dataset(self) -> PipelineResult<Dataset> {
        let headers: Vec<String> = self.headers.iter().map(|h| h.trim().to_string()).collect();
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !index.contains_key(*c)) {
            return Err(PipelineError::MissingColumn(missing.to_string()));
        }

        let col = |name: &str| index.get(name).copied();
        let date_idx = col(ORDER_DATE);
        let dim_idx: Vec<Option<usize>> = Dimension::ALL
            .iter()
            .map(|d| col(d.column_name()))
            .collect();
        let sales_idx = col(Measure::Sales.column_name());
        let profit_idx = col(Measure::Profit.column_name());
        let quantity_idx = col(Measure::Quantity.column_name());

        let mut records = Vec::with_capacity(self.rows.len());
        for (row_no, row) in self.rows.iter().enumerate() {
            let raw_date = cell(row, date_idx);
            let order_date =
                parse_mixed_date(raw_date).ok_or_else(|| PipelineError::DateParse {
                    column: ORDER_DATE.to_string(),
                    row: row_no,
                    value: raw_date.to_string(),
                })?;

            let text = |dim: Dimension| cell(row, dim_idx[dim as usize]).to_string();

            records.push(Record {
                order_date,
                region: text(Dimension::Region),
                state: text(Dimension::State),
                city: text(Dimension::City),
                category: text(Dimension::Category),
                sub_category: text(Dimension::SubCategory),
                segment: text(Dimension::Segment),
                sales: parse_amount(cell(row, sales_idx), Measure::Sales, row_no)?,
                profit: parse_amount(cell(row, profit_idx), Measure::Profit, row_no)?,
                quantity: parse_count(cell(row, quantity_idx), row_no)?,
            });
        }

        Ok(Dataset::new(records, headers))
    }
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// Currency cell: blank counts as zero, `$` and thousands separators are ignored.
fn parse_amount(s: &str, measure: Measure, row: usize) -> PipelineResult<f64> {
    if s.is_empty() {
        return Ok(0.0);
    }
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.parse::<f64>().map_err(|_| PipelineError::NumberParse {
        column: measure.column_name().to_string(),
        row,
        value: s.to_string(),
    })
}

/// Integer cell; integral decimals such as `3.0` are accepted.
fn parse_count(s: &str, row: usize) -> PipelineResult<i64> {
    if s.is_empty() {
        return Ok(0);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
        _ => Err(PipelineError::NumberParse {
            column: Measure::Quantity.column_name().to_string(),
            row,
            value: s.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV from any reader. Fields that are not valid UTF-8 are decoded as
/// ISO-8859-1, the encoding the public Superstore export ships in.
pub fn load_csv_reader<R: Read>(reader: R) -> PipelineResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader.byte_headers()?.iter().map(decode_field).collect();

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        rows.push(record.iter().map(decode_field).collect());
    }

    RawTable { headers, rows }.into_dataset()
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Order Date": "11/8/2016", "Region": "South", "Sales": 261.96, ... },
///   ...
/// ]
/// ```
pub fn load_json_str(text: &str) -> PipelineResult<Dataset> {
    let root: JsonValue = serde_json::from_str(text)?;
    let items = root
        .as_array()
        .ok_or_else(|| PipelineError::JsonLayout("expected top-level array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| PipelineError::JsonLayout(format!("row {i} is not an object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    RawTable { headers, rows }.into_dataset()
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Each column is rendered to text with Arrow's display
/// formatter (dates come out as ISO strings), then typed like CSV.
fn load_parquet(path: &Path) -> PipelineResult<Dataset> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Headers come from the file schema so a file with no rows still loads.
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for batch_result in builder.build()? {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        Ok(String::new())
                    } else {
                        array_value_to_string(col, row)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
    }

    log::debug!("Parquet file {} yielded {} rows", path.display(), rows.len());
    RawTable { headers, rows }.into_dataset()
}
