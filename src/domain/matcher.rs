//! Matcher engine — pure predicates over observed values.
//!
//! All matchers are total for valid inputs: a predicate either yields a
//! definite bool or a typed error. There is no partial match treated as a
//! pass.

use regex::Regex;

use crate::domain::check::{CompareOp, Expected, MatcherKind, Value};
use crate::domain::error::MatchError;

/// Apply a matcher predicate to an observed value.
///
/// # Errors
///
/// Returns `InvalidPattern` for a malformed regex, `TypeMismatch` when the
/// predicate cannot apply to the observed value's type, and
/// `UnresolvedExpected` if a per-platform table survived to evaluation.
pub fn apply(kind: &MatcherKind, observed: &Value) -> Result<bool, MatchError> {
    match kind {
        MatcherKind::Equals(expected) => Ok(resolve(expected)? == observed),
        MatcherKind::Matches(pattern) => {
            let re = Regex::new(pattern).map_err(|e| MatchError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            match observed {
                Value::Str(s) => Ok(re.is_match(s)),
                other => Err(MatchError::TypeMismatch(format!(
                    "cannot match /{pattern}/ against non-string value {other}"
                ))),
            }
        }
        MatcherKind::Includes(expected) => {
            let needle = resolve(expected)?;
            match (observed, needle) {
                (Value::List(items), Value::Str(s)) => Ok(items.contains(s)),
                (Value::List(items), other) => Ok(items.contains(&other.to_string())),
                (Value::Str(haystack), Value::Str(s)) => Ok(haystack.contains(s.as_str())),
                (other, _) => Err(MatchError::TypeMismatch(format!(
                    "cannot test membership in non-collection value {other}"
                ))),
            }
        }
        MatcherKind::Compare { op, value } => compare(*op, observed, resolve(value)?),
    }
}

fn resolve(expected: &Expected) -> Result<&Value, MatchError> {
    expected.literal().ok_or(MatchError::UnresolvedExpected)
}

fn compare(op: CompareOp, observed: &Value, expected: &Value) -> Result<bool, MatchError> {
    use std::cmp::Ordering;

    let ordering = match (observed, expected) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => match op {
            CompareOp::Eq => return Ok(a == b),
            CompareOp::Ne => return Ok(a != b),
            _ => {
                return Err(MatchError::TypeMismatch(format!(
                    "cannot order booleans with '{op}'"
                )));
            }
        },
        (a, b) => {
            return Err(MatchError::TypeMismatch(format!(
                "cannot compare {a} with {b}"
            )));
        }
    };

    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

/// Render a mismatch as a report detail, e.g.
/// `"home: expected /home/deskpro, got /home/dp"`.
#[must_use]
pub fn describe_mismatch(field: &str, not: bool, kind: &MatcherKind, observed: &Value) -> String {
    let neg = if not { "not " } else { "" };
    match kind {
        MatcherKind::Equals(expected) => {
            format!("{field}: expected {neg}{}, got {observed}", render(expected))
        }
        MatcherKind::Matches(pattern) => {
            format!("{field}: expected {neg}match /{pattern}/, got {observed}")
        }
        MatcherKind::Includes(expected) => {
            format!("{field}: expected {neg}to include {}, got {observed}", render(expected))
        }
        MatcherKind::Compare { op, value } => {
            format!("{field}: expected {neg}{op} {}, got {observed}", render(value))
        }
    }
}

fn render(expected: &Expected) -> String {
    match expected.literal() {
        Some(v) => v.to_string(),
        None => "(per-platform value)".to_string(),
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
