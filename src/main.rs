//! ob - Open Badges issuing CLI
//!
//! Build Open Badges 2.0 assertions, publish them to a GitHub-hosted site
//! through pull requests, and verify what is published.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use openbadge::Result;
use openbadge::app::AppContext;
use openbadge::cli::Cli;
use openbadge::cli::output::emit_error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            emit_error(&e, cli.output_format());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    openbadge::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,openbadge=info",
        1 => "info,openbadge=debug",
        2 => "debug,openbadge=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.output_format().is_machine_readable() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
