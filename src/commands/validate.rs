//! `vigil validate` — parse a suite without evaluating it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::infra::suite_file;
use crate::output::OutputContext;
use crate::output::human::HumanRenderer;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the check suite file
    #[arg(long, value_name = "PATH")]
    pub suite: PathBuf,
}

/// Run `vigil validate`.
///
/// # Errors
///
/// Returns an error (exit code 2) if the suite cannot be read or parsed.
pub fn run(ctx: &OutputContext, json: bool, args: &ValidateArgs) -> Result<ExitCode> {
    let loaded = suite_file::load(&args.suite)?;

    if json {
        let out = serde_json::json!({
            "name": loaded.name,
            "checks": loaded.suite.len(),
            "fingerprint": loaded.fingerprint,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("JSON serialization")?
        );
    } else {
        HumanRenderer::new(ctx).render_validation(
            loaded.name.as_deref(),
            loaded.suite.len(),
            &loaded.fingerprint,
        );
    }
    Ok(ExitCode::SUCCESS)
}
