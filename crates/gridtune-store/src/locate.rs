//! Locating stored result files that satisfy parameter constraints.
//!
//! Two retrieval modes share one walk: the any-depth mode backs reads
//! (a "contains all constraints" filter), the exact-depth mode backs
//! resume checks, where a configuration with three parameters must not
//! count results written by shallower or deeper sweeps.

use std::path::{Path, PathBuf};

use gridtune_core::{strip_name, values_equivalent, ErrorInfo, ParamSet, TuneError};
use walkdir::WalkDir;

fn walk_error(root: &Path, err: walkdir::Error) -> TuneError {
    TuneError::Storage(
        ErrorInfo::new("locate.walk", "failed to walk result tree")
            .with_context("root", root.display().to_string())
            .with_hint(err.to_string()),
    )
}

#[derive(Debug, Clone, PartialEq)]
struct Constraint {
    key: String,
    value: Option<String>,
}

/// Collapses textually identical duplicates; distinct values for one name
/// stay separate constraints.
fn constraints(params: &ParamSet) -> Result<Vec<Constraint>, TuneError> {
    let mut wanted: Vec<Constraint> = Vec::new();
    for param in params {
        let constraint = Constraint {
            key: param.key().to_string(),
            value: param.rendered_value()?,
        };
        if !wanted.contains(&constraint) {
            wanted.push(constraint);
        }
    }
    Ok(wanted)
}

fn constraint_matches(segment: &str, constraint: &Constraint) -> bool {
    match segment.split_once('=') {
        None => constraint.value.is_none() && strip_name(segment) == constraint.key,
        Some((name, segment_value)) => match &constraint.value {
            None => false,
            Some(value) => {
                strip_name(name) == constraint.key && values_equivalent(segment_value, value)
            }
        },
    }
}

/// Directory segments of `file` relative to `root`, excluding the file name.
fn directory_segments<'a>(root: &Path, file: &'a Path) -> Vec<&'a str> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut segments: Vec<&str> = relative.iter().filter_map(|c| c.to_str()).collect();
    segments.pop();
    segments
}

fn find(
    root: &Path,
    ext: &str,
    params: &ParamSet,
    exact_depth: bool,
) -> Result<Vec<PathBuf>, TuneError> {
    let wanted = constraints(params)?;
    let mut matches = Vec::new();
    if !root.is_dir() {
        return Ok(matches);
    }
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let segments = directory_segments(root, entry.path());
        if exact_depth {
            let shaped = segments.iter().filter(|s| s.contains('=')).count();
            if shaped != wanted.len() {
                continue;
            }
        }
        let satisfied = wanted
            .iter()
            .all(|c| segments.iter().any(|s| constraint_matches(s, c)));
        if satisfied {
            matches.push(entry.into_path());
        }
    }
    matches.sort();
    Ok(matches)
}

/// Every `.<ext>` file under `root` whose path contains a matching segment
/// for each constraint, at any depth. An empty constraint set matches
/// every file.
pub fn find_all(root: &Path, ext: &str, params: &ParamSet) -> Result<Vec<PathBuf>, TuneError> {
    find(root, ext, params, false)
}

/// As [`find_all`], but the number of `name=value`-shaped directory
/// segments in each file's path must equal the constraint count exactly.
pub fn find_at_depth(root: &Path, ext: &str, params: &ParamSet) -> Result<Vec<PathBuf>, TuneError> {
    find(root, ext, params, true)
}
