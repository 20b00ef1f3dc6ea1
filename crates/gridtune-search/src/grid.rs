//! Cartesian grid construction and resumable enumeration.

use std::collections::BTreeSet;
use std::fmt;

use gridtune_core::{
    render_value, strip_name, ErrorInfo, ExistingRuns, Param, ParamSet, Searcher, TuneError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One axis of a sweep grid: a parameter name and its candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParameter {
    /// Parameter name, optionally carrying a CLI prefix.
    pub name: String,
    /// Candidate values tried for this parameter.
    pub values: Vec<Value>,
}

/// Declarative sweep plan: grid axes plus the repeat count per
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Grid axes in declaration order (first axis varies slowest).
    pub parameters: Vec<GridParameter>,
    /// Runs wanted per configuration; 0 proposes each entry once and
    /// forbids resume skipping.
    #[serde(default)]
    pub runs: usize,
}

fn exhausted() -> TuneError {
    TuneError::Exhausted(ErrorInfo::new(
        "grid.end",
        "reached end of grid, no more configurations to try",
    ))
}

fn expand(axes: &[GridParameter]) -> Result<Vec<ParamSet>, TuneError> {
    let mut seen = BTreeSet::new();
    for axis in axes {
        if !seen.insert(strip_name(&axis.name)) {
            return Err(TuneError::DuplicateParameter(
                ErrorInfo::new("grid.duplicate_axis", "grid axis name given twice")
                    .with_context("name", strip_name(&axis.name)),
            ));
        }
        for value in &axis.values {
            if !value.is_null() {
                render_value(value)?;
            }
        }
    }
    let mut grid = Vec::new();
    let mut current = Vec::with_capacity(axes.len());
    expand_axes(axes, &mut current, &mut grid);
    Ok(grid)
}

fn expand_axes(axes: &[GridParameter], current: &mut Vec<Param>, grid: &mut Vec<ParamSet>) {
    let Some(axis) = axes.first() else {
        grid.push(current.clone().into());
        return;
    };
    for value in &axis.values {
        current.push(Param::new(axis.name.clone(), value.clone()));
        expand_axes(&axes[1..], current, grid);
        current.pop();
    }
}

/// Resumable cartesian-grid searcher.
///
/// The grid is built once from the axes and never mutated. Enumeration
/// walks a `(grid_index, run_index)` cursor: each configuration is
/// proposed `runs` times before advancing, and a bound existence oracle
/// lets the cursor resume exactly where previously completed runs left
/// off. Exhaustion is terminal.
pub struct GridSearcher {
    grid: Vec<ParamSet>,
    runs: usize,
    cursor: Option<(usize, usize)>,
    oracle: Option<Box<dyn ExistingRuns>>,
}

impl fmt::Debug for GridSearcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSearcher")
            .field("grid", &self.grid.len())
            .field("runs", &self.runs)
            .field("cursor", &self.cursor)
            .field("oracle", &self.oracle.is_some())
            .finish()
    }
}

impl GridSearcher {
    /// Builds the full cartesian grid; the first axis varies slowest.
    /// An empty value list on any axis yields an empty grid.
    pub fn new(axes: &[GridParameter], runs: usize) -> Result<Self, TuneError> {
        Ok(Self {
            grid: expand(axes)?,
            runs,
            cursor: None,
            oracle: None,
        })
    }

    /// Builds a searcher from a declarative plan.
    pub fn from_plan(plan: &SweepPlan) -> Result<Self, TuneError> {
        Self::new(&plan.parameters, plan.runs)
    }

    /// Number of distinct configurations in the grid.
    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    /// Runs wanted per configuration.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Explicit scan (not recursion: grids can be large) for the next
    /// configuration with work left, starting at `index`.
    fn skip_from(&self, mut index: usize) -> Result<(usize, usize), TuneError> {
        match &self.oracle {
            None => {
                if index < self.grid.len() {
                    Ok((index, 0))
                } else {
                    Err(exhausted())
                }
            }
            Some(oracle) => {
                while index < self.grid.len() {
                    let existing = oracle.existing_runs(&self.grid[index])?;
                    if existing < self.runs {
                        return Ok((index, existing));
                    }
                    index += 1;
                }
                Err(exhausted())
            }
        }
    }
}

impl Searcher for GridSearcher {
    fn total(&self) -> usize {
        self.grid.len() * self.runs.max(1)
    }

    fn next_config(&mut self) -> Result<ParamSet, TuneError> {
        if let Some((index, _)) = self.cursor {
            if index >= self.grid.len() {
                return Err(exhausted());
            }
        }
        let advanced = match self.cursor {
            None => self.skip_from(0),
            Some((index, run)) if run + 1 < self.runs => Ok((index, run + 1)),
            Some((index, _)) => self.skip_from(index + 1),
        };
        match advanced {
            Ok((index, run)) => {
                self.cursor = Some((index, run));
                Ok(self.grid[index].clone())
            }
            Err(err) => {
                if err.is_exhausted() {
                    self.cursor = Some((self.grid.len(), 0));
                }
                Err(err)
            }
        }
    }

    fn check_existing_runs(&mut self, oracle: Box<dyn ExistingRuns>) -> Result<(), TuneError> {
        if self.runs == 0 {
            return Err(TuneError::Plan(
                ErrorInfo::new("grid.zero_runs", "cannot skip existing runs when runs = 0")
                    .with_hint("set runs > 0 to enable resume"),
            ));
        }
        self.oracle = Some(oracle);
        Ok(())
    }
}

impl Iterator for GridSearcher {
    type Item = Result<ParamSet, TuneError>;

    /// Exhaustion is the normal end of the sequence; every other error is
    /// surfaced to the caller.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_config() {
            Err(err) if err.is_exhausted() => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn axes() -> Vec<GridParameter> {
        vec![
            GridParameter {
                name: "--p1".to_string(),
                values: vec![json!(1), json!(2)],
            },
            GridParameter {
                name: "--p2".to_string(),
                values: vec![json!("a"), json!("b")],
            },
        ]
    }

    #[test]
    fn first_axis_varies_slowest() {
        let searcher = GridSearcher::new(&axes(), 1).unwrap();
        let tokens: Vec<Vec<String>> = searcher
            .map(|config| config.unwrap().tokens().unwrap())
            .collect();
        assert_eq!(
            tokens,
            vec![
                vec!["--p1=1", "--p2=a"],
                vec!["--p1=1", "--p2=b"],
                vec!["--p1=2", "--p2=a"],
                vec!["--p1=2", "--p2=b"],
            ]
        );
    }

    #[test]
    fn duplicate_axis_names_are_rejected() {
        let mut bad = axes();
        bad[1].name = "p1".to_string();
        let err = GridSearcher::new(&bad, 1).unwrap_err();
        assert!(matches!(err, TuneError::DuplicateParameter(_)));
    }

    #[test]
    fn empty_value_list_empties_the_grid() {
        let mut bad = axes();
        bad[0].values.clear();
        let searcher = GridSearcher::new(&bad, 1).unwrap();
        assert_eq!(searcher.grid_len(), 0);
    }
}
