//! Command-line interface for downwatch
//!
//! Uses clap with derive for type-safe CLI parsing

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// downwatch - cron-driven uptime monitor
#[derive(Parser)]
#[command(name = "downwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Optional TOML configuration file (environment overrides it)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dotenv file to load (default: search for .env upward from cwd)
    #[arg(short, long)]
    pub env_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scheduled pass: sanity letter if due, check the target, alert if down
    Run {
        /// Print letters instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the target once and print the result (exits 1 when down)
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Send the sanity letter to every recipient now
    Sanity {
        /// Print letters instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration
    Validate,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Generate shell completion scripts
    pub fn generate_completion(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "downwatch", &mut std::io::stdout());
    }
}
