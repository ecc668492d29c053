//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Declarative host state verification
#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate a check suite against a target host
    Verify(commands::verify::VerifyArgs),

    /// Parse a check suite without evaluating it
    Validate(commands::validate::ValidateArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command, returning the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error on configuration or suite parse failure; the caller
    /// maps this to exit code 2. Check failures are NOT errors — `verify`
    /// reports them through the returned exit code (1).
    pub async fn run(self) -> Result<ExitCode> {
        let Cli { no_color, quiet, json, command } = self;
        let ctx = crate::output::OutputContext::new(no_color, quiet);
        match command {
            Command::Verify(args) => commands::verify::run(&ctx, json, args).await,
            Command::Validate(args) => commands::validate::run(&ctx, json, &args),
            Command::Version => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
