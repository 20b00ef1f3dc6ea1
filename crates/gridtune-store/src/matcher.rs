//! Deepest-match resolution of a configuration onto an existing tree.
//!
//! Directory names encode `name=value` tokens. Resolution searches the
//! root for the deepest chain of directories whose names match the
//! requested parameter names (values are ignored at this stage), then
//! appends one segment per parameter that matched nowhere. Matched
//! segments keep the tree's order; appended segments keep the caller's.

use std::fs;
use std::path::Path;

use gridtune_core::{strip_name, ErrorInfo, Param, ParamSet, TuneError};

fn scan_error(path: &Path, err: impl ToString) -> TuneError {
    TuneError::Storage(
        ErrorInfo::new("matcher.scan", "failed to list directory")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// Search key of a directory name: the text before the first `=`, prefix
/// stripped, with `=` re-appended. A name without `=` yields `name=`, so
/// bare flag directories participate in matching too.
fn segment_search_key(name: &str) -> String {
    let head = name.split('=').next().unwrap_or(name);
    format!("{}=", strip_name(head))
}

fn subdirectories(dir: &Path) -> Result<Vec<String>, TuneError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| scan_error(dir, err))? {
        let entry = entry.map_err(|err| scan_error(dir, err))?;
        let file_type = entry.file_type().map_err(|err| scan_error(dir, err))?;
        if file_type.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    // Sorted so depth ties resolve the same way on every walk.
    names.sort();
    Ok(names)
}

/// Depth-first search for the longest chain of directories consuming one
/// search key per level. Returns the consumed keys in tree order; ties
/// keep the first chain found.
fn deepest_chain(dir: &Path, keys: &[String]) -> Result<Vec<String>, TuneError> {
    let mut best: Vec<String> = Vec::new();
    if keys.is_empty() {
        return Ok(best);
    }
    for name in subdirectories(dir)? {
        let segment_key = segment_search_key(&name);
        let Some(position) = keys.iter().position(|key| *key == segment_key) else {
            continue;
        };
        let mut remaining = keys.to_vec();
        remaining.remove(position);
        let mut chain = vec![segment_key];
        chain.extend(deepest_chain(&dir.join(&name), &remaining)?);
        if chain.len() > best.len() {
            best = chain;
        }
    }
    Ok(best)
}

/// Resolves a configuration to a relative directory path under `root`.
///
/// The returned segments are rendered from the caller's values: matched
/// levels are re-rendered (the tree supplies the order, the caller the
/// value), and never-matched parameters are appended in caller order.
/// Duplicate parameter names are a hard error.
pub fn resolve(root: &Path, params: &ParamSet) -> Result<Vec<String>, TuneError> {
    params.ensure_unique_keys()?;
    let keys: Vec<String> = params.params().iter().map(Param::search_key).collect();
    let matched = if root.is_dir() {
        deepest_chain(root, &keys)?
    } else {
        Vec::new()
    };
    let mut segments = Vec::with_capacity(params.len());
    for key in &matched {
        let param = params
            .params()
            .iter()
            .find(|p| p.search_key() == *key)
            .ok_or_else(|| {
                TuneError::Storage(
                    ErrorInfo::new("matcher.lost_key", "matched key absent from parameter set")
                        .with_context("key", key.clone()),
                )
            })?;
        segments.push(param.token()?);
    }
    for param in params {
        if !matched.contains(&param.search_key()) {
            segments.push(param.token()?);
        }
    }
    Ok(segments)
}
