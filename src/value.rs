//! Case values and field-path resolution.
//!
//! A [`Value`] is the closed set of kinds a case record (or an expression
//! literal) can hold. Mappings model nested records; every other kind is a
//! leaf. Resolution of a dotted field path against a case is pure and never
//! mutates its input.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A case value: one of `{null, bool, integer, real, string, mapping}`.
///
/// `BTreeMap` is used (rather than a hash map) so that canonicalization
/// (§4.4) never has to re-sort keys that are already in byte-lexicographic
/// order — insertion order is irrelevant to this type on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness used by `Not`/`And`/`Or`: `null` and `false` are falsy,
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric value as `f64`, for comparisons that mix integer and real.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Map(_) => write!(f, "<map>"),
        }
    }
}

/// A case record: always a mapping at the top level, immutable during
/// execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case(pub BTreeMap<String, Value>);

impl Case {
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }

    /// Resolve a dotted field path against this case.
    ///
    /// Walks segments left-to-right through nested mappings. Absence
    /// (missing key, or a non-mapping value encountered before the path is
    /// exhausted) is reported to the caller rather than panicking; the
    /// evaluator turns that into a `field_not_found` evaluation error.
    pub fn resolve(&self, path: &str) -> Result<&Value, String> {
        let mut segments = path.split('.');
        let first = segments.next().ok_or_else(|| path.to_string())?;
        let mut current = self.0.get(first).ok_or_else(|| path.to_string())?;

        for segment in segments {
            match current {
                Value::Map(m) => {
                    current = m.get(segment).ok_or_else(|| path.to_string())?;
                }
                _ => return Err(path.to_string()),
            }
        }
        Ok(current)
    }
}
