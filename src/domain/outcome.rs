//! Outcomes and the run summary.

use serde::Serialize;

/// Final status of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Probe succeeded and every matcher held.
    Pass,
    /// Probe succeeded but a matcher mismatched.
    Fail,
    /// The probe itself (or a matcher's machinery) failed.
    Error,
}

/// The recorded result of evaluating one check. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub name: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Pass,
            detail: None,
        }
    }

    #[must_use]
    pub fn fail(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Fail,
            detail: Some(detail),
        }
    }

    #[must_use]
    pub fn error(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Error,
            detail: Some(detail),
        }
    }
}

/// Aggregated counts over a run's outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub total: usize,
}

impl Summary {
    /// Tally a sequence of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let mut summary = Summary {
            passed: 0,
            failed: 0,
            errored: 0,
            total: outcomes.len(),
        };
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Pass => summary.passed += 1,
                OutcomeStatus::Fail => summary.failed += 1,
                OutcomeStatus::Error => summary.errored += 1,
            }
        }
        summary
    }

    /// Overall success: no failures and no errors.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
