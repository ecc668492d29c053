//! `vigil verify` — evaluate a check suite against a target host.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::application::evaluator::{self, EvalOptions};
use crate::application::ports::{HttpClient, Transport};
use crate::application::probes::ProbeRunner;
use crate::application::ports::ProgressReporter as _;
use crate::application::report::RunReport;
use crate::domain::outcome::Outcome;
use crate::domain::target::Target;
use crate::infra::config::YamlConfigStore;
use crate::infra::http::UreqHttpClient;
use crate::infra::local::LocalTransport;
use crate::infra::ssh::SshTransport;
use crate::infra::suite_file::{self, LoadedSuite};
use crate::output::OutputContext;
use crate::output::human::HumanRenderer;
use crate::output::reporter::TerminalReporter;
use crate::output::{json, progress};

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Target host: `local`, `host`, `user@host`, or `ssh://user@host:port`
    #[arg(long, default_value = "local")]
    pub target: String,

    /// Path to the check suite file
    #[arg(long, value_name = "PATH")]
    pub suite: PathBuf,

    /// Worker limit for concurrent check evaluation
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Run-level timeout in seconds; unfinished checks become errors
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Per-probe timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<u64>,
}

/// Run `vigil verify`.
///
/// # Errors
///
/// Returns an error (exit code 2) on configuration problems: unreadable or
/// malformed suite, bad target designation, or a platform table with no
/// entry for the probed platform. Check failures and probe errors are NOT
/// errors — they are reported and mapped to exit code 1.
pub async fn run(ctx: &OutputContext, json_mode: bool, args: VerifyArgs) -> Result<ExitCode> {
    let config = YamlConfigStore.load()?;
    let loaded = suite_file::load(&args.suite)?;
    let target = Target::parse(&args.target).map_err(|e| anyhow::anyhow!(e))?;

    let options = EvalOptions {
        concurrency: args.concurrency.unwrap_or(config.defaults.concurrency),
        run_timeout: args
            .timeout
            .or(config.defaults.timeout_secs)
            .map(Duration::from_secs),
    };
    let probe_timeout =
        Duration::from_secs(args.probe_timeout.unwrap_or(config.defaults.probe_timeout_secs));

    match target {
        Target::Local => {
            let runner = ProbeRunner::new(LocalTransport, UreqHttpClient, probe_timeout);
            evaluate_and_report(ctx, json_mode, loaded, &runner, &options).await
        }
        Target::Ssh { host, user, port } => {
            let transport = SshTransport::new(host, user, port, config.ssh.clone());
            let runner = ProbeRunner::new(transport, UreqHttpClient, probe_timeout);
            evaluate_and_report(ctx, json_mode, loaded, &runner, &options).await
        }
    }
}

async fn evaluate_and_report<T, H>(
    ctx: &OutputContext,
    json_mode: bool,
    loaded: LoadedSuite,
    runner: &ProbeRunner<T, H>,
    options: &EvalOptions,
) -> Result<ExitCode>
where
    T: Transport,
    H: HttpClient,
{
    let LoadedSuite {
        suite,
        name,
        fingerprint,
        path,
    } = loaded;
    tracing::info!(
        suite = %path.display(),
        checks = suite.len(),
        target = %runner.endpoint(),
        "starting verification run"
    );

    // Platform-keyed expected values are resolved once, before evaluation.
    let reporter = TerminalReporter::new(ctx);
    let (suite, platform) = if suite.requires_platform() {
        match runner.detect_platform().await {
            Ok(platform) => {
                if !json_mode {
                    reporter.step(&format!("resolving expectations for platform {platform}"));
                }
                let resolved = suite.resolve_platform(&platform)?;
                (resolved, Some(platform))
            }
            Err(e) => {
                if !json_mode {
                    reporter.warn("platform detection failed");
                }
                // The target never answered: every check gets an Error
                // outcome rather than aborting the run with a config error.
                let started_at = chrono::Utc::now();
                let outcomes: Vec<Outcome> = suite
                    .checks()
                    .iter()
                    .map(|c| Outcome::error(&c.name, format!("platform detection failed: {e}")))
                    .collect();
                let report = RunReport::assemble(
                    name,
                    runner.endpoint(),
                    None,
                    fingerprint,
                    started_at,
                    Duration::ZERO,
                    outcomes,
                );
                render(ctx, json_mode, &report)?;
                return Ok(ExitCode::from(1));
            }
        }
    } else {
        (suite, None)
    };

    let spinner = (ctx.show_progress() && !json_mode).then(|| {
        progress::spinner(&format!(
            "running {} checks against {}",
            suite.len(),
            runner.endpoint()
        ))
    });

    let started_at = chrono::Utc::now();
    let started = std::time::Instant::now();
    let outcomes = evaluator::run(&suite, runner, options).await;
    let duration = started.elapsed();

    if let Some(pb) = spinner {
        progress::finish_clear(&pb);
    }

    let report = RunReport::assemble(
        name,
        runner.endpoint(),
        platform,
        fingerprint,
        started_at,
        duration,
        outcomes,
    );
    render(ctx, json_mode, &report)?;

    if report.summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn render(ctx: &OutputContext, json_mode: bool, report: &RunReport) -> Result<()> {
    if json_mode {
        println!("{}", json::format_report(report)?);
    } else {
        HumanRenderer::new(ctx).render_report(report);
    }
    Ok(())
}
