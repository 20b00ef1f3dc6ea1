//! Parameter-keyed hierarchical result storage for sweep runs.
//!
//! Results live under a root directory whose levels are `name=value`
//! tokens; the path to a result file is the configuration that produced
//! it. Resolution reuses the deepest existing chain of matching levels,
//! values that differ only in numeric formatting share a directory, and
//! repeated runs of one configuration become sequentially numbered
//! `results_<N>` files.

pub mod locate;
pub mod log;
pub mod matcher;
pub mod numeric;
pub mod store;
pub mod table;

pub use locate::{find_all, find_at_depth};
pub use log::MetricLog;
pub use matcher::resolve;
pub use numeric::reconcile;
pub use store::{CsvStore, MetricReading, Objective, RunHandle, RESULT_STEM};
pub use table::{Collation, Selection, Table};
