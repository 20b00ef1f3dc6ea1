//! Parameter model shared by the result store and the searchers.
//!
//! A configuration is an ordered list of named parameters. Names may carry
//! a CLI prefix (`--lr`); all matching is done on the stripped bare name,
//! while rendering keeps the name exactly as supplied so directory names
//! round-trip through the scheduler command line unchanged.

use std::collections::BTreeSet;
use std::slice;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorInfo, TuneError};

/// Strips surrounding whitespace and a leading `--` or `-` from a name.
pub fn strip_name(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed
        .strip_prefix("--")
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed)
}

/// True when two rendered values are equal literally or as numbers.
pub fn values_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

fn invalid(code: &str, message: impl Into<String>, token: &str) -> TuneError {
    TuneError::InvalidParameter(ErrorInfo::new(code, message).with_context("token", token))
}

/// Renders a scalar parameter value in its natural string form.
///
/// Composite JSON values have no path representation and are rejected, as
/// is any rendering that would itself contain `=`.
pub fn render_value(value: &Value) -> Result<String, TuneError> {
    let rendered = match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => {
            return Err(invalid(
                "param.value_kind",
                "parameter values must be scalars",
                &other.to_string(),
            ))
        }
    };
    if rendered.is_empty() {
        return Err(invalid(
            "param.value_empty",
            "empty parameter value; use a bare flag name instead",
            "",
        ));
    }
    if rendered.contains('=') {
        return Err(invalid(
            "param.value_eq",
            "parameter values must not contain '='",
            &rendered,
        ));
    }
    Ok(rendered)
}

/// A single named parameter with an optional scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Name as supplied by the caller, possibly carrying a CLI prefix.
    pub name: String,
    /// Scalar value, or `None` for a bare flag.
    pub value: Option<Value>,
}

impl Param {
    /// Creates a parameter with a value. `Value::Null` becomes a bare flag.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let value = match value {
            Value::Null => None,
            other => Some(other),
        };
        Self {
            name: name.into(),
            value,
        }
    }

    /// Creates a parameter with no value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Parses a `name=value` token; a token without `=` is a bare flag.
    pub fn parse(token: &str) -> Result<Self, TuneError> {
        let trimmed = token.trim();
        match trimmed.split_once('=') {
            None => {
                if strip_name(trimmed).is_empty() {
                    Err(invalid("param.name_empty", "empty parameter name", token))
                } else {
                    Ok(Self::flag(trimmed))
                }
            }
            Some((name, value)) => {
                if strip_name(name).is_empty() {
                    return Err(invalid("param.name_empty", "empty parameter name", token));
                }
                if value.is_empty() {
                    return Err(invalid(
                        "param.value_empty",
                        "empty parameter value; use a bare flag name instead",
                        token,
                    ));
                }
                if value.contains('=') {
                    return Err(invalid(
                        "param.value_eq",
                        "parameter values must not contain '='",
                        token,
                    ));
                }
                Ok(Self::new(name, Value::String(value.to_string())))
            }
        }
    }

    /// Bare name used for all matching.
    pub fn key(&self) -> &str {
        strip_name(&self.name)
    }

    /// Search key in `name=` form, prefix stripped.
    pub fn search_key(&self) -> String {
        format!("{}=", self.key())
    }

    /// Rendered value, or `None` for a bare flag.
    pub fn rendered_value(&self) -> Result<Option<String>, TuneError> {
        match &self.value {
            None => Ok(None),
            Some(value) => render_value(value).map(Some),
        }
    }

    /// Serialized `name=value` token using the stored name verbatim.
    pub fn token(&self) -> Result<String, TuneError> {
        let name = self.name.trim();
        if strip_name(name).is_empty() {
            return Err(invalid("param.name_empty", "empty parameter name", name));
        }
        if name.contains('=') {
            return Err(invalid(
                "param.name_eq",
                "parameter names must not contain '='",
                name,
            ));
        }
        match self.rendered_value()? {
            None => Ok(name.to_string()),
            Some(value) => Ok(format!("{name}={value}")),
        }
    }

    /// Serialized token guaranteed to carry a `--` prefix, for schedulers.
    pub fn cli_token(&self) -> Result<String, TuneError> {
        let token = self.token()?;
        if token.starts_with("--") {
            Ok(token)
        } else {
            Ok(format!("--{}", token.trim_start_matches('-')))
        }
    }
}

/// Ordered collection of parameters identifying one run configuration.
///
/// Order is the caller's declaration order and only matters when new
/// directory segments are appended; membership is keyed on the stripped
/// bare names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParamSet(Vec<Param>);

impl ParamSet {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a list of `name=value` tokens into a configuration.
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, TuneError> {
        tokens.iter().map(|t| Param::parse(t.as_ref())).collect()
    }

    /// Appends a parameter, keeping the caller's order.
    pub fn push(&mut self, param: Param) {
        self.0.push(param);
    }

    /// Number of parameters in the configuration.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the configuration has no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.0
    }

    /// Looks up a parameter by its stripped bare name.
    pub fn get(&self, key: &str) -> Option<&Param> {
        let key = strip_name(key);
        self.0.iter().find(|p| p.key() == key)
    }

    /// Fails with [`TuneError::DuplicateParameter`] when a bare name repeats.
    pub fn ensure_unique_keys(&self) -> Result<(), TuneError> {
        let mut seen = BTreeSet::new();
        for param in &self.0 {
            if !seen.insert(param.key()) {
                return Err(TuneError::DuplicateParameter(
                    ErrorInfo::new("param.duplicate", "parameter name given twice")
                        .with_context("name", param.key()),
                ));
            }
        }
        Ok(())
    }

    /// Serialized `name=value` tokens in declaration order.
    pub fn tokens(&self) -> Result<Vec<String>, TuneError> {
        self.0.iter().map(Param::token).collect()
    }

    /// Serialized tokens with a guaranteed `--` prefix, in declaration order.
    pub fn cli_args(&self) -> Result<Vec<String>, TuneError> {
        self.0.iter().map(Param::cli_token).collect()
    }
}

impl From<Vec<Param>> for ParamSet {
    fn from(params: Vec<Param>) -> Self {
        Self(params)
    }
}

impl FromIterator<Param> for ParamSet {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ParamSet {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Param;
    type IntoIter = slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
