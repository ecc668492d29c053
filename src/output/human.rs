//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::report::RunReport;
use crate::domain::outcome::OutcomeStatus;
use crate::output::OutputContext;

/// Renders run reports as human-readable terminal output using
/// `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render a full verification report, preserving check order.
    ///
    /// Quiet mode prints failing and erroring checks plus the summary line;
    /// passing checks are suppressed.
    pub fn render_report(&self, report: &RunReport) {
        if !self.ctx.quiet {
            println!();
            let title = match &report.suite {
                Some(suite) => format!("Vigil Verification — {suite} against {}", report.target),
                None => format!("Vigil Verification against {}", report.target),
            };
            println!("  {}", title.style(self.ctx.styles.header));
            if let Some(platform) = &report.platform {
                println!("  {}", format!("platform: {platform}").style(self.ctx.styles.dim));
            }
            println!();
        }

        for outcome in &report.outcomes {
            match outcome.status {
                OutcomeStatus::Pass => {
                    if !self.ctx.quiet {
                        println!("    {} {}", "✓".style(self.ctx.styles.success), outcome.name);
                    }
                }
                OutcomeStatus::Fail => {
                    println!("    {} {}", "✗".style(self.ctx.styles.error), outcome.name);
                    if let Some(detail) = &outcome.detail {
                        println!("      {}", detail.style(self.ctx.styles.dim));
                    }
                }
                OutcomeStatus::Error => {
                    println!(
                        "    {} {} {}",
                        "!".style(self.ctx.styles.warning),
                        outcome.name,
                        "(error)".style(self.ctx.styles.dim)
                    );
                    if let Some(detail) = &outcome.detail {
                        println!("      {}", detail.style(self.ctx.styles.dim));
                    }
                }
            }
        }

        let s = &report.summary;
        println!();
        let line = format!(
            "{} checks: {} passed, {} failed, {} errored ({:.1}s)",
            s.total,
            s.passed,
            s.failed,
            s.errored,
            report.duration_ms as f64 / 1000.0
        );
        if s.all_passed() {
            println!("  {} {line}", "✓".style(self.ctx.styles.success));
        } else {
            println!("  {} {line}", "✗".style(self.ctx.styles.error));
        }
        println!();
    }

    /// Render the outcome of a parse-only validation.
    pub fn render_validation(&self, name: Option<&str>, checks: usize, fingerprint: &str) {
        let suite = name.unwrap_or("suite");
        let preview: String = fingerprint.chars().take(12).collect();
        self.ctx
            .success(&format!("{suite}: {checks} checks (sha256 {preview}…)"));
    }
}
