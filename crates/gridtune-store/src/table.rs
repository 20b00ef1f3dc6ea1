//! In-memory tabular results and their CSV representation.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, WriterBuilder};
use gridtune_core::{ErrorInfo, TuneError};
use serde::{Deserialize, Serialize};

fn table_error(code: &str, path: &Path, err: impl ToString) -> TuneError {
    TuneError::Table(
        ErrorInfo::new(code, "tabular result failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// How a metric column is reduced to representative values.
///
/// Every strategy except `All` yields a single value per result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Smallest observation.
    Min,
    /// Largest observation.
    Max,
    /// Arithmetic mean of all observations.
    Mean,
    /// Median observation (midpoint mean for even counts).
    Median,
    /// First logged observation.
    First,
    /// Last logged observation.
    Last,
    /// Every observation, in log order.
    All,
}

impl FromStr for Selection {
    type Err = TuneError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "min" => Ok(Selection::Min),
            "max" => Ok(Selection::Max),
            "mean" => Ok(Selection::Mean),
            "median" => Ok(Selection::Median),
            "first" => Ok(Selection::First),
            "last" => Ok(Selection::Last),
            "all" => Ok(Selection::All),
            other => Err(TuneError::Plan(
                ErrorInfo::new("select.unknown", "unknown selection strategy")
                    .with_context("select", other)
                    .with_hint("expected min, max, mean, median, first, last or all"),
            )),
        }
    }
}

/// How reduced values are collated across result files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collation {
    /// One entry per result file, unaveraged.
    All,
    /// Files sharing a configuration directory are averaged together.
    Mean,
}

impl FromStr for Collation {
    type Err = TuneError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "all" => Ok(Collation::All),
            "mean" => Ok(Collation::Mean),
            other => Err(TuneError::Plan(
                ErrorInfo::new("collate.unknown", "unknown collation strategy")
                    .with_context("collate", other)
                    .with_hint("expected mean or all"),
            )),
        }
    }
}

/// Column-labelled table of string cells.
///
/// Cells are kept as strings so arbitrary metric schemas round-trip; the
/// metric column is parsed only when a reduction is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Table {
    /// Column labels, in file order.
    pub columns: Vec<String>,
    /// Row cells, aligned with `columns`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with the given column labels.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn add_column(&mut self, name: &str) -> usize {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Appends a row given as `(column, cell)` pairs, extending the column
    /// set as needed; columns absent from the row get empty cells.
    pub fn push_row<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut row = vec![String::new(); self.columns.len()];
        for (name, value) in cells {
            let index = match self.column_index(name) {
                Some(index) => index,
                None => {
                    let index = self.add_column(name);
                    row.push(String::new());
                    index
                }
            };
            row[index] = value;
        }
        self.rows.push(row);
    }

    /// Outer-join merge: `other`'s rows are appended after this table's
    /// rows, with cells for columns unknown to either side left empty.
    pub fn merge(&mut self, other: &Table) {
        let mut indices = Vec::with_capacity(other.columns.len());
        for column in &other.columns {
            let index = match self.column_index(column) {
                Some(index) => index,
                None => self.add_column(column),
            };
            indices.push(index);
        }
        for row in &other.rows {
            let mut merged = vec![String::new(); self.columns.len()];
            for (cell, &index) in row.iter().zip(&indices) {
                merged[index] = cell.clone();
            }
            self.rows.push(merged);
        }
    }

    /// Reduces the named metric column. Empty cells (from outer joins) are
    /// skipped; a cell that does not parse as a number is an error, and a
    /// missing column is [`TuneError::MetricNotFound`].
    pub fn reduce(&self, metric: &str, select: Selection) -> Result<Vec<f64>, TuneError> {
        let index = self.column_index(metric).ok_or_else(|| {
            TuneError::MetricNotFound(
                ErrorInfo::new("table.metric", "metric column absent from table")
                    .with_context("metric", metric),
            )
        })?;
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let cell = &row[index];
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| {
                TuneError::Table(
                    ErrorInfo::new("table.metric_parse", "metric cell is not numeric")
                        .with_context("metric", metric)
                        .with_context("cell", cell.clone()),
                )
            })?;
            values.push(value);
        }
        if values.is_empty() {
            return Ok(values);
        }
        let reduced = match select {
            Selection::Min => vec![values.iter().copied().fold(f64::INFINITY, f64::min)],
            Selection::Max => vec![values.iter().copied().fold(f64::NEG_INFINITY, f64::max)],
            Selection::Mean => vec![values.iter().sum::<f64>() / values.len() as f64],
            Selection::Median => vec![median(&mut values.clone())],
            Selection::First => vec![values[0]],
            Selection::Last => vec![values[values.len() - 1]],
            Selection::All => values,
        };
        Ok(reduced)
    }

    /// Reads a headed CSV file into a table.
    pub fn read_csv(path: &Path) -> Result<Self, TuneError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|err| table_error("table.read", path, err))?;
        let columns = reader
            .headers()
            .map_err(|err| table_error("table.headers", path, err))?
            .iter()
            .map(|h| h.to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| table_error("table.record", path, err))?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(Self { columns, rows })
    }

    /// Writes the table as a headed CSV file, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<(), TuneError> {
        let file = File::create(path).map_err(|err| table_error("table.create", path, err))?;
        let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));
        writer
            .write_record(&self.columns)
            .map_err(|err| table_error("table.write_header", path, err))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|err| table_error("table.write_row", path, err))?;
        }
        writer
            .flush()
            .map_err(|err| table_error("table.flush", path, err))
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
