//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tagsync_core::MigrationMapping;

/// tagsync - Keep tagged blocks in sync across files
#[derive(Parser, Debug)]
#[command(name = "tagsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: nearest tagsync.toml, .tagsync.toml,
    /// tagsync.json or tagsync.yaml)
    #[arg(short, long, global = true, env = "TAGSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON for CI/CD integration
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Report desynchronized tags without changing any file
    ///
    /// Exit codes: 0 in sync, 1 fatal error, 2 no matching files,
    /// 3 unfixable errors, 4 fixable errors.
    Check(ScanArgs),

    /// Rewrite stale tag declarations
    ///
    /// A file is only rewritten when every error in it can be fixed.
    ///
    /// Examples:
    ///   tagsync fix                 # Fix everything below the current directory
    ///   tagsync fix docs --dry-run  # Preview fixes under docs/
    Fix {
        #[command(flatten)]
        scan: ScanArgs,

        /// Preview fixes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

/// What to scan and how to read it
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Only scan files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Skip files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Comment start recognized before a tag (repeatable, replaces defaults)
    #[arg(long = "comment", value_name = "TOKEN")]
    pub comments: Vec<String>,

    /// File or directory name marking a logical root
    #[arg(long, value_name = "NAME")]
    pub root_marker: Option<String>,

    /// Accept blocks with no content
    #[arg(long)]
    pub allow_empty_tags: bool,

    /// Migrate targets from one root-relative prefix to another (repeatable)
    #[arg(long, value_name = "FROM=TO", value_parser = parse_mapping)]
    pub migrate: Vec<MigrationMapping>,

    /// Migrate every mapped target, not only those without a return tag
    #[arg(long)]
    pub migrate_all: bool,

    /// Check a cache written by --write-cache instead of scanning
    #[arg(long, value_name = "FILE", conflicts_with = "write_cache")]
    pub read_cache: Option<PathBuf>,

    /// Scan and store the cache without checking
    #[arg(long, value_name = "FILE")]
    pub write_cache: Option<PathBuf>,
}

fn parse_mapping(value: &str) -> Result<MigrationMapping, String> {
    match value.split_once('=') {
        Some((from, to)) if !from.is_empty() => Ok(MigrationMapping {
            from: from.to_string(),
            to: to.to_string(),
        }),
        _ => Err(format!("expected FROM=TO, got '{}'", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn command_is_required() {
        assert!(Cli::try_parse_from(["tagsync"]).is_err());
    }

    #[test]
    fn parse_check_defaults_to_current_dir() {
        let cli = Cli::parse_from(["tagsync", "check"]);
        assert!(!cli.global.verbose);
        match cli.command {
            Commands::Check(scan) => {
                assert_eq!(scan.paths, vec![PathBuf::from(".")]);
                assert!(scan.comments.is_empty());
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tagsync", "check", "src", "--json", "-v"]);
        assert!(cli.global.json);
        assert!(cli.global.verbose);
    }

    #[test]
    fn parse_fix_dry_run() {
        let cli = Cli::parse_from(["tagsync", "fix", "a.md", "b.md", "--dry-run"]);
        match cli.command {
            Commands::Fix { scan, dry_run } => {
                assert!(dry_run);
                assert_eq!(scan.paths.len(), 2);
            }
            _ => panic!("Expected Fix command"),
        }
    }

    #[test]
    fn parse_migration_flags() {
        let cli = Cli::parse_from([
            "tagsync",
            "check",
            "--migrate",
            "old/=new/",
            "--migrate-all",
        ]);
        match cli.command {
            Commands::Check(scan) => {
                assert_eq!(
                    scan.migrate,
                    vec![MigrationMapping {
                        from: "old/".into(),
                        to: "new/".into()
                    }]
                );
                assert!(scan.migrate_all);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn mapping_without_separator_is_rejected() {
        assert!(Cli::try_parse_from(["tagsync", "check", "--migrate", "old"]).is_err());
        assert!(Cli::try_parse_from(["tagsync", "check", "--migrate", "=new"]).is_err());
    }

    #[test]
    fn cache_flags_conflict() {
        let result = Cli::try_parse_from([
            "tagsync",
            "check",
            "--read-cache",
            "a.json",
            "--write-cache",
            "b.json",
        ]);
        assert!(result.is_err());
    }
}
