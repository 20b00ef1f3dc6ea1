//! Structured error types shared across the gridtune crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`TuneError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable code identifying the failure site.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, parameter names, counts).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional remediation hint surfaced to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a payload from a code and a message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Attaches a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint to the payload.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.code)?;
        for (key, value) in &self.context {
            write!(f, " {key}={value}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Canonical error type for the gridtune workspace.
///
/// Variant families follow the failure taxonomy of the store and the
/// searchers. An empty read result is deliberately not represented here:
/// a query with no matching files returns an empty vector so callers can
/// branch on "no data yet" without error handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail")]
pub enum TuneError {
    /// The same parameter name was supplied more than once.
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(ErrorInfo),
    /// A parameter name or value cannot be rendered into a path token.
    #[error("invalid parameter: {0}")]
    InvalidParameter(ErrorInfo),
    /// A stored directory name has a missing or misplaced `=`.
    #[error("malformed segment: {0}")]
    MalformedSegment(ErrorInfo),
    /// A result-extension file that is not a numbered `results_` file.
    #[error("unexpected file: {0}")]
    UnexpectedFile(ErrorInfo),
    /// A requested metric column is absent from a matched result file.
    #[error("metric not found: {0}")]
    MetricNotFound(ErrorInfo),
    /// The enumerator has no further configurations to propose.
    #[error("search exhausted: {0}")]
    Exhausted(ErrorInfo),
    /// A sweep plan is unreadable or internally inconsistent.
    #[error("plan error: {0}")]
    Plan(ErrorInfo),
    /// A filesystem operation failed.
    #[error("storage error: {0}")]
    Storage(ErrorInfo),
    /// A tabular result file could not be encoded or decoded.
    #[error("table error: {0}")]
    Table(ErrorInfo),
    /// The external batch scheduler rejected a job submission.
    #[error("submit error: {0}")]
    Submit(ErrorInfo),
}

impl TuneError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            TuneError::DuplicateParameter(info)
            | TuneError::InvalidParameter(info)
            | TuneError::MalformedSegment(info)
            | TuneError::UnexpectedFile(info)
            | TuneError::MetricNotFound(info)
            | TuneError::Exhausted(info)
            | TuneError::Plan(info)
            | TuneError::Storage(info)
            | TuneError::Table(info)
            | TuneError::Submit(info) => info,
        }
    }

    /// True when the error marks the normal end of an enumeration.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TuneError::Exhausted(_))
    }
}
