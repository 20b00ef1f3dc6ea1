//! Numeric reconciliation of a resolved path against existing directories.
//!
//! `--lr=0.5` and `--lr=0.50` name the same configuration; whichever
//! spelling reached the disk first wins. Reconciliation walks a resolved
//! path one segment at a time and substitutes an existing sibling when
//! its value is numerically equal, keeping that sibling's original
//! formatting.

use std::fs;
use std::path::{Path, PathBuf};

use gridtune_core::{strip_name, ErrorInfo, TuneError};

fn scan_error(path: &Path, err: impl ToString) -> TuneError {
    TuneError::Storage(
        ErrorInfo::new("numeric.scan", "failed to list directory")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

fn malformed(segment: &str, reason: &str) -> TuneError {
    TuneError::MalformedSegment(
        ErrorInfo::new("numeric.segment", reason).with_context("segment", segment),
    )
}

/// Splits a segment into `(name, value)`. Segments without `=` are opaque
/// and return `None`; a second `=` or an `=` touching either end of the
/// segment is a hard error.
fn split_segment(segment: &str) -> Result<Option<(&str, &str)>, TuneError> {
    let Some((name, value)) = segment.split_once('=') else {
        return Ok(None);
    };
    if name.is_empty() || value.is_empty() {
        return Err(malformed(segment, "'=' at segment boundary"));
    }
    if value.contains('=') {
        return Err(malformed(segment, "segment contains more than one '='"));
    }
    Ok(Some((name, value)))
}

/// Looks for an existing sibling directory naming the same parameter with
/// a numerically equal value. Returns the sibling's on-disk name.
fn numeric_sibling(
    level: &Path,
    key: &str,
    value: f64,
) -> Result<Option<String>, TuneError> {
    for entry in fs::read_dir(level).map_err(|err| scan_error(level, err))? {
        let entry = entry.map_err(|err| scan_error(level, err))?;
        if !entry.file_type().map_err(|err| scan_error(level, err))?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some((sibling_key, sibling_value)) = name.split_once('=') else {
            continue;
        };
        if strip_name(sibling_key) != key {
            continue;
        }
        if let Ok(parsed) = sibling_value.parse::<f64>() {
            if parsed == value {
                return Ok(Some(name));
            }
        }
    }
    Ok(None)
}

/// Walks `segments` under `root`, reusing existing directories whose
/// values are numerically equal to the requested ones. Once the walk
/// leaves real disk content the remaining literal segments concatenate
/// without further existence checks.
pub fn reconcile(root: &Path, segments: &[String]) -> Result<PathBuf, TuneError> {
    let mut current = root.to_path_buf();
    let mut on_disk = current.is_dir();
    for segment in segments {
        let parts = split_segment(segment)?;
        if !on_disk {
            current = current.join(segment);
            continue;
        }
        let literal = current.join(segment);
        if literal.is_dir() {
            current = literal;
            continue;
        }
        let numeric_value = parts.and_then(|(_, value)| value.parse::<f64>().ok());
        if let (Some((name, _)), Some(value)) = (parts, numeric_value) {
            if let Some(existing) = numeric_sibling(&current, strip_name(name), value)? {
                current = current.join(existing);
                continue;
            }
        }
        current = literal;
        on_disk = false;
    }
    Ok(current)
}
