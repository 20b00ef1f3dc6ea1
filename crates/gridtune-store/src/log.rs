//! In-memory metric logging for a single run.

use chrono::{SecondsFormat, Utc};
use gridtune_core::TuneError;

use crate::table::{Selection, Table};

const TIME_COLUMN: &str = "time_stamp";

/// Accumulates metric observations for the current run.
///
/// Each [`MetricLog::log`] call appends one row to an in-memory table;
/// the first column is always the timestamp at which the call was made.
/// Log as soon as a metric is available, one observation per call, and
/// hand the accumulated table to a store when the run finishes.
#[derive(Debug, Clone)]
pub struct MetricLog {
    results: Table,
}

impl Default for MetricLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            results: Table::with_columns(vec![TIME_COLUMN.to_string()]),
        }
    }

    /// Appends one timestamped row of metric observations.
    pub fn log<'a, I>(&mut self, metrics: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut cells = vec![(TIME_COLUMN, stamp)];
        cells.extend(
            metrics
                .into_iter()
                .map(|(name, value)| (name, value.to_string())),
        );
        self.results.push_row(cells);
    }

    /// The accumulated results table.
    pub fn results(&self) -> &Table {
        &self.results
    }

    /// True when nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Reduces a logged metric without going through storage.
    pub fn read_reduced(&self, metric: &str, select: Selection) -> Result<Vec<f64>, TuneError> {
        self.results.reduce(metric, select)
    }
}
