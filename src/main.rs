//! Vigil CLI - Declarative host state verification

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vigil_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr so they never corrupt --json output on stdout.
    let filter = EnvFilter::try_from_env("VIGIL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            if json_mode {
                match vigil_cli::output::json::format_error(&format!("{e:#}"), "config_error") {
                    Ok(obj) => eprintln!("{obj}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(2)
        }
    }
}
