//! Check and fix command implementations
//!
//! Both commands resolve options from the config file and flags, run the
//! engine and report through the human or JSON logger.

use std::path::Path;

use colored::Colorize;
use tagsync_core::{
    CacheConfig, CacheMode, Config, Engine, ExitCode, MigrationMode, Options,
};
use tagsync_fs::NormalizedPath;

use crate::cli::{GlobalArgs, ScanArgs};
use crate::error::Result;
use crate::logger::{HumanLogger, JsonLogger};

/// Run the check command
///
/// Reports every error and never writes, whatever the config says about
/// `auto_fix`.
pub fn run_check(cwd: &NormalizedPath, global: &GlobalArgs, scan: &ScanArgs) -> Result<ExitCode> {
    let options = resolve_options(cwd, global, scan, None)?;
    execute(cwd, &options, scan)
}

/// Run the fix command
pub fn run_fix(
    cwd: &NormalizedPath,
    global: &GlobalArgs,
    scan: &ScanArgs,
    dry_run: bool,
) -> Result<ExitCode> {
    let options = resolve_options(cwd, global, scan, Some(dry_run))?;
    execute(cwd, &options, scan)
}

fn execute(cwd: &NormalizedPath, options: &Options, scan: &ScanArgs) -> Result<ExitCode> {
    let paths: Vec<NormalizedPath> = scan.paths.iter().map(|p| absolute(cwd, p)).collect();
    let engine = Engine::new(options);

    if options.json {
        let outcome = engine.run(&paths, JsonLogger::new(cwd.clone()))?;
        println!("{}", outcome.logger.render(outcome.exit_code, &outcome.summary)?);
        return Ok(outcome.exit_code);
    }

    if !options.dry_run && options.auto_fix {
        println!("{} Fixing tagged blocks...", "=>".blue().bold());
    } else {
        println!("{} Checking tagged blocks...", "=>".blue().bold());
    }
    let outcome = engine.run(&paths, HumanLogger::new(cwd.clone()))?;
    match (outcome.exit_code, &options.cache) {
        (ExitCode::NoMatchingFiles, _) => {
            println!("{} No files matched.", "NOTHING".yellow().bold());
        }
        (
            ExitCode::Success,
            Some(tagsync_core::CacheOptions {
                mode: CacheMode::Write,
                path,
            }),
        ) => {
            println!("{} Wrote cache to {}", "OK".green().bold(), path.as_str().cyan());
        }
        _ => {}
    }
    Ok(outcome.exit_code)
}

/// Layer the config file, then command-line flags, over the defaults.
///
/// `fix` is `None` for a read-only check and `Some(dry_run)` for a fix.
pub fn resolve_options(
    cwd: &NormalizedPath,
    global: &GlobalArgs,
    scan: &ScanArgs,
    fix: Option<bool>,
) -> Result<Options> {
    let file = match &global.config {
        Some(path) => Some(absolute(cwd, path)),
        None => Config::discover(cwd),
    };

    let mut config = match &file {
        Some(path) => {
            tracing::debug!(path = %path, "Loading config");
            let mut config = Config::load(path)?;
            // Cache paths in a config file are relative to that file
            if let (Some(cache), Some(dir)) = (&mut config.cache, path.parent()) {
                cache.path = absolute(&dir, Path::new(&cache.path)).as_str().to_string();
            }
            config
        }
        None => Config::default(),
    };

    if scan.migrate_all || !scan.migrate.is_empty() {
        let mut migration = config.migration.take().unwrap_or_default();
        if !scan.migrate.is_empty() {
            migration.mappings = scan.migrate.clone();
        }
        if scan.migrate_all {
            migration.mode = MigrationMode::All;
        }
        config.migration = Some(migration);
    }

    let flags = Config {
        include: non_empty(&scan.include),
        exclude: non_empty(&scan.exclude),
        comments: non_empty(&scan.comments),
        auto_fix: Some(fix.is_some()),
        dry_run: fix,
        json: global.json.then_some(true),
        root_marker: scan.root_marker.clone(),
        allow_empty_tags: scan.allow_empty_tags.then_some(true),
        cache: cache_flag(cwd, scan),
        ..Config::default()
    };

    Ok(Options::from_config(config.merge(flags))?)
}

fn cache_flag(cwd: &NormalizedPath, scan: &ScanArgs) -> Option<CacheConfig> {
    let (path, mode) = match (&scan.read_cache, &scan.write_cache) {
        (Some(path), _) => (path, CacheMode::Read),
        (None, Some(path)) => (path, CacheMode::Write),
        (None, None) => return None,
    };
    Some(CacheConfig {
        path: absolute(cwd, path).as_str().to_string(),
        mode,
    })
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn absolute(base: &NormalizedPath, path: &Path) -> NormalizedPath {
    NormalizedPath::new(base.to_native().join(path))
}
