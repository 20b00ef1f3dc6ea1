//! CSV-backed result store keyed by parameter configurations.
//!
//! Each configuration owns one directory (resolved by the matcher and
//! numeric reconciliation) holding sequentially numbered result files.
//! Multiple runs of the same configuration become `results_0`,
//! `results_1`, ... in that directory; repeated appends through one
//! handle grow a single file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use gridtune_core::{ErrorInfo, ExistingRuns, ParamSet, TuneError};
use rand::{thread_rng, Rng};
use serde::Serialize;

use crate::locate;
use crate::log::MetricLog;
use crate::matcher;
use crate::numeric;
use crate::table::{Collation, Selection, Table};

/// File-name prefix of every numbered result file.
pub const RESULT_STEM: &str = "results_";

fn storage_error(code: &str, path: &Path, err: impl ToString) -> TuneError {
    TuneError::Storage(
        ErrorInfo::new(code, "filesystem operation failed")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// One reduced metric reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReading {
    /// Result file, or configuration directory once collated across runs.
    pub path: PathBuf,
    /// Reduced metric values; a single value unless [`Selection::All`].
    pub values: Vec<f64>,
}

/// Direction used when picking the best configuration from readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Lower metric values are better.
    Minimize,
    /// Higher metric values are better.
    Maximize,
}

/// Store writing one CSV result file per (configuration, run) pair under
/// a root directory whose levels encode `name=value` tokens.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    ext: String,
}

impl CsvStore {
    /// Creates a store rooted at `root` with the `csv` extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, "csv")
    }

    /// Creates a store for an arbitrary result file extension.
    pub fn with_extension(root: impl Into<PathBuf>, ext: &str) -> Self {
        Self {
            root: root.into(),
            ext: ext.trim_start_matches('.').to_string(),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Result file extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.ext
    }

    /// Resolves the directory for a configuration: deepest existing match,
    /// appended missing parameters, numeric reconciliation.
    pub fn resolve_dir(&self, params: &ParamSet) -> Result<PathBuf, TuneError> {
        let segments = matcher::resolve(&self.root, params)?;
        numeric::reconcile(&self.root, &segments)
    }

    fn next_index(&self, dir: &Path) -> Result<u64, TuneError> {
        if !dir.is_dir() {
            return Ok(0);
        }
        let suffix = format!(".{}", self.ext);
        let mut next = 0;
        for entry in fs::read_dir(dir).map_err(|err| storage_error("store.scan", dir, err))? {
            let entry = entry.map_err(|err| storage_error("store.scan", dir, err))?;
            if !entry
                .file_type()
                .map_err(|err| storage_error("store.scan", dir, err))?
                .is_file()
            {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stem) = name.strip_suffix(&suffix) else {
                continue;
            };
            let index = stem
                .strip_prefix(RESULT_STEM)
                .and_then(|digits| digits.parse::<u64>().ok())
                .ok_or_else(|| {
                    TuneError::UnexpectedFile(
                        ErrorInfo::new("store.stray_file", "result directory holds a foreign file")
                            .with_context("path", entry.path().display().to_string())
                            .with_hint(format!("expected {RESULT_STEM}<N>{suffix}")),
                    )
                })?;
            next = next.max(index + 1);
        }
        Ok(next)
    }

    /// Path of the next unused `results_<N>.<ext>` file for a
    /// configuration. Indices are never reused, even across holes.
    pub fn result_path(&self, params: &ParamSet) -> Result<PathBuf, TuneError> {
        let dir = self.resolve_dir(params)?;
        let index = self.next_index(&dir)?;
        Ok(dir.join(format!("{RESULT_STEM}{index}.{}", self.ext)))
    }

    /// Allocates a caller-held handle pinning one result file path.
    ///
    /// The handle owns the allocated path for the lifetime of the run, so
    /// several configurations can be written side by side without the
    /// store tracking any "current" path.
    pub fn open(&self, params: &ParamSet) -> Result<RunHandle, TuneError> {
        Ok(RunHandle {
            path: self.result_path(params)?,
        })
    }

    /// Reads a metric across every stored result matching `params`.
    ///
    /// Matching is depth-agnostic: results written by shallower or deeper
    /// sweeps participate as long as every constraint appears in their
    /// path. An empty return is the normal "no data yet" outcome, not an
    /// error; a matched file lacking the metric column is.
    pub fn read(
        &self,
        params: &ParamSet,
        metric: &str,
        select: Selection,
        collate: Collation,
    ) -> Result<Vec<MetricReading>, TuneError> {
        let files = locate::find_all(&self.root, &self.ext, params)?;
        match collate {
            Collation::All => {
                let mut readings = Vec::with_capacity(files.len());
                for file in files {
                    let values = Table::read_csv(&file)?.reduce(metric, select)?;
                    readings.push(MetricReading { path: file, values });
                }
                Ok(readings)
            }
            Collation::Mean => {
                let mut groups: BTreeMap<PathBuf, Vec<f64>> = BTreeMap::new();
                for file in files {
                    let values = Table::read_csv(&file)?.reduce(metric, select)?;
                    let dir = file.parent().unwrap_or(&self.root).to_path_buf();
                    groups.entry(dir).or_default().extend(values);
                }
                Ok(groups
                    .into_iter()
                    .filter(|(_, values)| !values.is_empty())
                    .map(|(path, values)| MetricReading {
                        path,
                        values: vec![values.iter().sum::<f64>() / values.len() as f64],
                    })
                    .collect())
            }
        }
    }

    /// Picks the best configuration among the readings for `params`.
    ///
    /// Returns the winning configuration as `name=value` tokens together
    /// with its metric value, or `None` when nothing matches yet.
    pub fn best(
        &self,
        params: &ParamSet,
        metric: &str,
        select: Selection,
        collate: Collation,
        objective: Objective,
    ) -> Result<Option<(Vec<String>, f64)>, TuneError> {
        let readings = self.read(params, metric, select, collate)?;
        let mut best: Option<(PathBuf, f64)> = None;
        for reading in readings {
            if reading.values.is_empty() {
                continue;
            }
            let candidate = match objective {
                Objective::Minimize => reading.values.iter().copied().fold(f64::INFINITY, f64::min),
                Objective::Maximize => reading
                    .values
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max),
            };
            let better = match (&best, objective) {
                (None, _) => true,
                (Some((_, current)), Objective::Minimize) => candidate < *current,
                (Some((_, current)), Objective::Maximize) => candidate > *current,
            };
            if better {
                best = Some((reading.path, candidate));
            }
        }
        Ok(best.map(|(path, value)| (self.config_tokens(&path), value)))
    }

    /// Number of completed runs stored for exactly this configuration.
    ///
    /// Depth-exact on purpose: a three-parameter configuration is not
    /// "already run" because a two-parameter sweep shares its prefix.
    pub fn exists(&self, params: &ParamSet) -> Result<usize, TuneError> {
        Ok(locate::find_at_depth(&self.root, &self.ext, params)?.len())
    }

    /// Directory segments of a stored path, rendered as tokens.
    fn config_tokens(&self, path: &Path) -> Vec<String> {
        let dir = if path.extension().and_then(|e| e.to_str()) == Some(self.ext.as_str()) {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        dir.strip_prefix(&self.root)
            .unwrap_or(dir)
            .iter()
            .filter_map(|c| c.to_str())
            .map(|c| c.to_string())
            .collect()
    }
}

impl ExistingRuns for CsvStore {
    fn existing_runs(&self, params: &ParamSet) -> Result<usize, TuneError> {
        self.exists(params)
    }
}

/// Caller-held handle pinning one allocated result file.
#[derive(Debug, Clone)]
pub struct RunHandle {
    path: PathBuf,
}

impl RunHandle {
    /// The allocated result file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a table of results, merging into the file if it exists.
    ///
    /// Missing parent directories are created after a random sub-second
    /// delay, which thins out creation races between independent
    /// processes sharing the root. Concurrent appends to one file remain
    /// last-write-wins.
    pub fn append(&self, results: &Table) -> Result<(), TuneError> {
        if let Some(parent) = self.path.parent() {
            if !parent.is_dir() {
                let jitter = thread_rng().gen_range(0..1000);
                thread::sleep(Duration::from_millis(jitter));
                fs::create_dir_all(parent)
                    .map_err(|err| storage_error("store.mkdir", parent, err))?;
            }
        }
        if self.path.exists() {
            let mut merged = Table::read_csv(&self.path)?;
            merged.merge(results);
            merged.write_csv(&self.path)
        } else {
            results.write_csv(&self.path)
        }
    }

    /// Saves everything accumulated in a metric log.
    pub fn save(&self, log: &MetricLog) -> Result<(), TuneError> {
        self.append(log.results())
    }
}
