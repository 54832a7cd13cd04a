//! In-memory tabular data read from delimited text.
//!
//! A `Table` keeps the header order of its source so that columns the
//! pipeline never looks at still reach the exported output unchanged.
//! Every cell is read as text; the normalizer later turns the known
//! numeric columns into `Cell::Number`.

use crate::{
    error::{SelectError, SelectResult},
    types::ColumnName,
};
use serde::Serialize;
use std::{borrow::Cow, collections::HashSet, fmt, io::Read, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Numeric value of the cell. Text cells have none, even if they look numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headers: Vec<ColumnName>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table. Header names must be unique.
    pub fn new(name: impl Into<String>, headers: Vec<ColumnName>) -> SelectResult<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for h in &headers {
            if !seen.insert(h.as_str()) {
                return Err(SelectError::parse(
                    name,
                    format!("duplicate column '{h}' in header row"),
                ));
            }
        }
        Ok(Self {
            name,
            headers,
            rows: Vec::new(),
        })
    }

    /// Read a table from CSV text with a header row.
    /// Fields are trimmed; ragged rows are rejected.
    pub fn from_csv_reader<R: Read>(name: &str, reader: R) -> SelectResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<ColumnName> = csv_reader
            .headers()
            .map_err(|e| SelectError::parse(name, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SelectError::parse(name, "no header row"));
        }

        let mut table = Table::new(name, headers)?;
        for result in csv_reader.records() {
            let record = result.map_err(|e| {
                let message = match e.position() {
                    Some(pos) => format!("line {}: {e}", pos.line()),
                    None => e.to_string(),
                };
                SelectError::parse(name, message)
            })?;
            table.push_row(record.iter().map(Cell::from).collect())?;
        }

        log::debug!(
            "loaded '{}': {} rows x {} columns",
            table.name,
            table.len(),
            table.headers.len()
        );
        Ok(table)
    }

    /// Read a table from a CSV file. The file name becomes the table name.
    pub fn from_csv_path(path: impl AsRef<Path>) -> SelectResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = std::fs::File::open(path)
            .map_err(|e| SelectError::parse(&display, format!("cannot open: {e}")))?;
        Self::from_csv_reader(&display, file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[ColumnName] {
        &self.headers
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

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Index of a column that must exist, or a schema error naming it.
    pub fn require_column(&self, table_label: &str, column: &str) -> SelectResult<usize> {
        self.column_index(column)
            .ok_or_else(|| SelectError::schema(table_label, column))
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> SelectResult<()> {
        if row.len() != self.headers.len() {
            return Err(SelectError::parse(
                &self.name,
                format!(
                    "row {} has {} fields, expected {}",
                    self.rows.len() + 1,
                    row.len(),
                    self.headers.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Mutable access to every cell of one column, top to bottom.
    pub fn column_cells_mut(&mut self, index: usize) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().filter_map(move |row| row.get_mut(index))
    }

    pub fn into_parts(self) -> (Vec<ColumnName>, Vec<Vec<Cell>>) {
        (self.headers, self.rows)
    }
}
