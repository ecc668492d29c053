//! Run report — the machine-readable aggregate handed to renderers.

use serde::Serialize;

use crate::domain::outcome::{Outcome, Summary};

/// Everything a renderer needs about one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Suite name from the suite file, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    /// Endpoint the checks ran against.
    pub target: String,
    /// Probed platform identifier, when platform resolution was needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// SHA-256 of the suite file.
    pub fingerprint: String,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    pub duration_ms: u64,
    /// Outcomes in check registration order.
    pub outcomes: Vec<Outcome>,
    pub summary: Summary,
}

impl RunReport {
    /// Assemble a report, tallying the summary from the outcomes.
    #[must_use]
    pub fn assemble(
        suite: Option<String>,
        target: String,
        platform: Option<String>,
        fingerprint: String,
        started_at: chrono::DateTime<chrono::Utc>,
        duration: std::time::Duration,
        outcomes: Vec<Outcome>,
    ) -> Self {
        let summary = Summary::from_outcomes(&outcomes);
        Self {
            suite,
            target,
            platform,
            fingerprint,
            started_at: started_at.to_rfc3339(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            outcomes,
            summary,
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
