//! Resumable grid enumeration for gridtune sweeps.

pub mod grid;

pub use grid::{GridParameter, GridSearcher, SweepPlan};
