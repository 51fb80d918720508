//! tagsync CLI
//!
//! Checks and repairs `sync-start`/`sync-end` tagged blocks that must stay
//! consistent across files.

mod cli;
mod commands;
mod error;
mod logger;

use clap::Parser;
use colored::Colorize;
use tagsync_core::ExitCode;
use tagsync_fs::NormalizedPath;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code.code()),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(ExitCode::Fatal.code());
        }
    }
}

fn run() -> Result<ExitCode> {
    // Usage errors are fatal, not clap's default exit code 2
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() {
            ExitCode::Fatal.code()
        } else {
            0
        };
        let _ = e.print();
        std::process::exit(code)
    });

    if cli.global.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;
        tracing::debug!("Verbose mode enabled");
    }

    let cwd = NormalizedPath::new(std::env::current_dir()?).canonicalize()?;
    match &cli.command {
        Commands::Check(scan) => commands::run_check(&cwd, &cli.global, scan),
        Commands::Fix { scan, dry_run } => commands::run_fix(&cwd, &cli.global, scan, *dry_run),
    }
}
