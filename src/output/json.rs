//! JSON output helpers.
//!
//! Machine-readable rendering of run reports and the error-object formatter
//! used by all `--json` code paths when a command fails.

use anyhow::{Context, Result};

use crate::application::report::RunReport;

/// Serialize a run report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice — `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::Outcome;

    #[test]
    fn test_format_report_schema() {
        let report = RunReport::assemble(
            Some("base".to_string()),
            "local".to_string(),
            Some("debian".to_string()),
            "abc".to_string(),
            chrono::Utc::now(),
            std::time::Duration::from_millis(10),
            vec![
                Outcome::pass("a"),
                Outcome::fail("b", "x: expected 1, got 2".to_string()),
            ],
        );
        let text = format_report(&report).expect("format");
        let v: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert_eq!(v["target"], "local");
        assert_eq!(v["summary"]["failed"], 1);
        assert_eq!(v["outcomes"][1]["status"], "fail");
        assert_eq!(v["outcomes"][1]["detail"], "x: expected 1, got 2");
    }
}
