#![deny(missing_docs)]
#![doc = "Core types and trait seams for the gridtune sweep engine."]

pub mod errors;
pub mod params;

pub use errors::{ErrorInfo, TuneError};
pub use params::{render_value, strip_name, values_equivalent, Param, ParamSet};

/// Oracle reporting how many completed runs exist for a configuration.
///
/// Implemented by result stores; searchers consult it to decide which
/// (configuration, run) pairs can be skipped on resume. Implementations
/// must be read-only: a query must not allocate result paths or create
/// directories.
pub trait ExistingRuns {
    /// Number of completed runs stored for exactly this configuration.
    fn existing_runs(&self, params: &ParamSet) -> Result<usize, TuneError>;
}

impl<F> ExistingRuns for F
where
    F: Fn(&ParamSet) -> Result<usize, TuneError>,
{
    fn existing_runs(&self, params: &ParamSet) -> Result<usize, TuneError> {
        self(params)
    }
}

/// Protocol for search strategies proposing run configurations.
pub trait Searcher {
    /// Number of (configuration, run) pairs proposed when no oracle is bound.
    fn total(&self) -> usize;

    /// Returns the next configuration to try, or [`TuneError::Exhausted`].
    fn next_config(&mut self) -> Result<ParamSet, TuneError>;

    /// Binds an existence oracle so completed runs are skipped on resume.
    fn check_existing_runs(&mut self, oracle: Box<dyn ExistingRuns>) -> Result<(), TuneError>;
}
