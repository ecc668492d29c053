//! The assertion graph — an ordered collection of named checks.
//!
//! Checks are independent by design: no inter-check dependencies, which is
//! what allows the evaluator to run them concurrently. Registration order is
//! the report order.

use crate::domain::check::{Check, Expected, MatcherKind};
use crate::domain::error::SuiteError;

/// Ordered, uniquely-named collection of checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suite {
    checks: Vec<Check>,
}

impl Suite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCheck` if a check with the same name exists, or
    /// `NoAssertions` if the check has an empty matcher list.
    pub fn register(&mut self, check: Check) -> Result<(), SuiteError> {
        if check.matchers.is_empty() {
            return Err(SuiteError::NoAssertions { check: check.name });
        }
        if self.checks.iter().any(|c| c.name == check.name) {
            return Err(SuiteError::DuplicateCheck(check.name));
        }
        self.checks.push(check);
        Ok(())
    }

    /// All checks in registration order.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Whether any expected value is a per-platform table, i.e. whether the
    /// caller must probe the target platform before evaluating.
    #[must_use]
    pub fn requires_platform(&self) -> bool {
        self.checks
            .iter()
            .flat_map(|c| &c.matchers)
            .any(|m| expected_of(&m.kind).is_some_and(|e| e.literal().is_none()))
    }

    /// Resolve every per-platform expected value against `platform`,
    /// returning a suite containing only literal expectations.
    ///
    /// Resolution happens once, before evaluation — assertion logic never
    /// branches on the platform.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedPlatform` naming the check and field if a table
    /// has no entry for `platform`.
    pub fn resolve_platform(mut self, platform: &str) -> Result<Self, SuiteError> {
        for check in &mut self.checks {
            for matcher in &mut check.matchers {
                let Some(expected) = expected_of_mut(&mut matcher.kind) else {
                    continue;
                };
                let Expected::ByPlatform { platform: table } = expected else {
                    continue;
                };
                let value = table.get(platform).cloned().ok_or_else(|| {
                    SuiteError::UnresolvedPlatform {
                        check: check.name.clone(),
                        field: matcher.field.clone(),
                        platform: platform.to_string(),
                    }
                })?;
                *expected = Expected::Literal(value);
            }
        }
        Ok(self)
    }
}

fn expected_of(kind: &MatcherKind) -> Option<&Expected> {
    match kind {
        MatcherKind::Equals(e) | MatcherKind::Includes(e) => Some(e),
        MatcherKind::Compare { value, .. } => Some(value),
        MatcherKind::Matches(_) => None,
    }
}

fn expected_of_mut(kind: &mut MatcherKind) -> Option<&mut Expected> {
    match kind {
        MatcherKind::Equals(e) | MatcherKind::Includes(e) => Some(e),
        MatcherKind::Compare { value, .. } => Some(value),
        MatcherKind::Matches(_) => None,
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
