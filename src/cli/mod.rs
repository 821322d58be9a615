//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Issue, publish and verify Open Badges backed by a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "ob")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human, json, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/openbadge/config.toml)
    #[arg(long, global = true, env = "OB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format.
    ///
    /// Priority order:
    /// 1. `--output-format`
    /// 2. `--machine` → JSON
    /// 3. Human
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        if self.machine {
            return OutputFormat::Json;
        }
        OutputFormat::Human
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the stored GitHub token
    Auth(commands::auth::AuthArgs),

    /// Choose the repository badges are published to
    Repo(commands::repo::RepoArgs),

    /// Build a badge assertion and optionally open a pull request for it
    Issue(commands::issue::IssueArgs),

    /// Open a pull request removing a published badge
    Revoke(commands::revoke::RevokeArgs),

    /// Fetch and check a published badge
    Verify(commands::verify::VerifyArgs),

    /// List published badges
    List(commands::list::ListArgs),
}
