//! In-memory tables parsed from downloaded open-data resources
//!
//! Only two layouts are understood: delimited text (CSV with a sniffed
//! delimiter) and tabular JSON. Anything else is reported as "no table"
//! by [`TableKind::detect`] rather than as an error.

use crate::error::{NewsletterError, Result};
use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Value};

/// Delimiter used when sniffing the header line fails
pub const FALLBACK_DELIMITER: u8 = b';';

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Numeric coercion; anything that does not read as a finite number is discarded
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) if s.is_empty() => Cell::Empty,
            Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Rows x named columns; short rows are padded with [`Cell::Empty`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// How a downloaded payload should be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Csv,
    Json,
}

impl TableKind {
    /// Pick a parser from the response content type, then the URL suffix
    pub fn detect(content_type: &str, url: &str) -> Option<Self> {
        let content_type = content_type.to_lowercase();
        if content_type.contains("csv") || url.ends_with(".csv") {
            Some(TableKind::Csv)
        } else if content_type.contains("json") || url.ends_with(".json") {
            Some(TableKind::Json)
        } else {
            None
        }
    }
}

pub fn parse_table(kind: TableKind, text: &str) -> Result<Table> {
    match kind {
        TableKind::Csv => parse_csv_auto(text),
        TableKind::Json => parse_json(text),
    }
}

/// Guess the delimiter from the header line
///
/// Picks the most frequent candidate outside quoted sections; ties go to
/// the earlier candidate (`,` `;` tab `|`).
pub fn sniff_delimiter(first_line: &str) -> Result<u8> {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;

    for byte in first_line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(pos) = DELIMITER_CANDIDATES.iter().position(|&d| d == byte) {
            counts[pos] += 1;
        }
    }

    let mut best: Option<(u8, usize)> = None;
    for (&delimiter, &count) in DELIMITER_CANDIDATES.iter().zip(counts.iter()) {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((delimiter, count));
        }
    }

    best.map(|(d, _)| d)
        .ok_or_else(|| NewsletterError::TableShape("Could not determine delimiter".to_string()))
}

/// Parse CSV with a sniffed delimiter, falling back to `;`
pub fn parse_csv_auto(text: &str) -> Result<Table> {
    let text = text.trim_start_matches('\u{feff}');
    let first_line = text.lines().next().unwrap_or_default();

    let sniffed = sniff_delimiter(first_line).and_then(|delimiter| parse_csv(text, delimiter));
    match sniffed {
        Ok(table) => Ok(table),
        Err(e) => {
            tracing::debug!(error = %e, "Delimiter detection failed, falling back to ';'");
            parse_csv(text, FALLBACK_DELIMITER)
        }
    }
}

pub fn parse_csv(text: &str, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.iter().all(String::is_empty) {
        return Err(NewsletterError::TableShape("CSV has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

/// Parse tabular JSON
///
/// Accepted layouts:
/// - `[{"col": v, ...}, ...]` (records; columns in first-seen order)
/// - `[[v, ...], ...]` or `[v, ...]` (positional columns "0", "1", ...)
/// - `{"col": [v, ...], ...}` or `{"col": {"row": v, ...}, ...}` (columns)
pub fn parse_json(text: &str) -> Result<Table> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(table_from_array(items)),
        Value::Object(map) => table_from_columns(map),
        other => Err(NewsletterError::TableShape(format!(
            "Expected a JSON array or object, got {}",
            json_kind(&other)
        ))),
    }
}

fn table_from_array(items: Vec<Value>) -> Table {
    if items.iter().all(Value::is_object) {
        let mut columns: Vec<String> = Vec::new();
        for item in &items {
            if let Value::Object(record) = item {
                for key in record.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        let rows = items
            .into_iter()
            .map(|item| match item {
                Value::Object(mut record) => columns
                    .iter()
                    .map(|c| record.remove(c).map(Cell::from).unwrap_or(Cell::Empty))
                    .collect(),
                _ => Vec::new(),
            })
            .collect();

        return Table::new(columns, rows);
    }

    let rows: Vec<Vec<Cell>> = items
        .into_iter()
        .map(|item| match item {
            Value::Array(values) => values.into_iter().map(Cell::from).collect(),
            scalar => vec![Cell::from(scalar)],
        })
        .collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let columns = (0..width).map(|i| i.to_string()).collect();

    Table::new(columns, rows)
}

fn table_from_columns(map: Map<String, Value>) -> Result<Table> {
    let mut index: Vec<String> = Vec::new();
    let mut columns = Vec::with_capacity(map.len());
    let mut data: Vec<Vec<(String, Value)>> = Vec::with_capacity(map.len());

    for (name, values) in map {
        let cells = match values {
            Value::Array(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect::<Vec<_>>(),
            Value::Object(values) => values.into_iter().collect(),
            other => {
                return Err(NewsletterError::TableShape(format!(
                    "Column '{}' holds a {} instead of a list",
                    name,
                    json_kind(&other)
                )))
            }
        };
        for (key, _) in &cells {
            if !index.contains(key) {
                index.push(key.clone());
            }
        }
        columns.push(name);
        data.push(cells);
    }

    let rows = index
        .iter()
        .map(|key| {
            data.iter()
                .map(|cells| {
                    cells
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| Cell::from(v.clone()))
                        .unwrap_or(Cell::Empty)
                })
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
