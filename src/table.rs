//! CSV Tables
//!
//! A small column-ordered table of optional string cells, used for the
//! item and price sheets. Missing values (empty CSV fields, JSON `null`)
//! are `None`; every row holds exactly one cell per column.

use serde_json::{Map, Value};
use thiserror::Error;

/// A single table cell; `None` is a missing value
pub type Cell = Option<String>;

const UTF8_BOM: &str = "\u{feff}";

/// Table errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} has {found} fields, expected {expected}")]
    RowLength {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Record {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("Table has no columns")]
    NoColumns,

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Failed to write CSV: {0}")]
    Write(String),
}

/// Column-ordered table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from explicit rows, checking row widths
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(TableError::RowLength {
                    row,
                    found: cells.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parse CSV with a header row. A leading UTF-8 BOM is ignored,
    /// empty fields become missing values and short rows are padded.
    pub fn from_csv_bytes(data: &[u8]) -> Result<Self, TableError> {
        let data = data.strip_prefix(UTF8_BOM.as_bytes()).unwrap_or(data);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(TableError::RowLength {
                    row,
                    found: record.len(),
                    expected: columns.len(),
                });
            }

            let mut cells: Vec<Cell> = record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect();
            cells.resize(columns.len(), None);
            rows.push(cells);
        }

        Ok(Self { columns, rows })
    }

    /// Build a table from a list of JSON objects. Columns appear in
    /// order of first occurrence across all records.
    pub fn from_records(records: &[Value]) -> Result<Self, TableError> {
        let mut columns: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or(TableError::NotAnObject(i))?;
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|object| {
                columns
                    .iter()
                    .map(|c| object.get(c).and_then(value_to_cell))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Read a cell; `None` for missing values and out-of-range indices
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Index of `name`, appending an empty column if it does not exist
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Remove a column; returns whether it existed
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Rewrite every column name
    pub fn rename_columns(&mut self, f: impl Fn(&str) -> String) {
        for column in &mut self.columns {
            *column = f(column);
        }
    }

    /// Stable sort of rows by a key
    pub fn sort_rows_by_key<K: Ord>(&mut self, f: impl FnMut(&Vec<Cell>) -> K) {
        self.rows.sort_by_key(f);
    }

    /// A row as a JSON object, missing values rendered as empty strings
    pub fn row_object(&self, row: usize) -> Map<String, Value> {
        let mut object = Map::new();
        if let Some(cells) = self.rows.get(row) {
            for (column, cell) in self.columns.iter().zip(cells) {
                object.insert(
                    column.clone(),
                    Value::String(cell.clone().unwrap_or_default()),
                );
            }
        }
        object
    }

    /// Serialize to CSV with `\n` line endings, optionally BOM-prefixed
    pub fn to_csv_bytes(&self, with_bom: bool) -> Result<Vec<u8>, TableError> {
        let mut out = Vec::new();
        if with_bom {
            out.extend_from_slice(UTF8_BOM.as_bytes());
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }

        writer
            .into_inner()
            .map_err(|e| TableError::Write(e.to_string()))
    }
}

/// Convert a JSON value to a cell the way a dataframe would stringify it
pub fn value_to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
