//! File enumeration with gitignore support via the `ignore` crate

use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use tagsync_fs::NormalizedPath;
use tagsync_fs::constants::IGNORE_FILE;

use crate::Result;
use crate::options::Options;

/// Expand `paths` into the sorted, de-duplicated list of files to scan.
///
/// Files given explicitly are taken as-is. Directories are walked honoring
/// `.gitignore`, `.tagsyncignore` and the configured ignore files, then
/// filtered by the include and exclude globs. Paths that do not exist are
/// skipped with a warning.
pub fn enumerate(paths: &[NormalizedPath], options: &Options) -> Result<Vec<NormalizedPath>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            walk(path, options, &mut files)?;
        } else {
            tracing::warn!(path = %path, "Path does not exist, skipping");
        }
    }
    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "Enumerated files");
    Ok(files)
}

fn walk(dir: &NormalizedPath, options: &Options, files: &mut Vec<NormalizedPath>) -> Result<()> {
    let mut builder = WalkBuilder::new(dir.to_native());
    builder
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILE)
        .overrides(globs(dir, options)?)
        .filter_entry(|e| e.file_name() != ".git");

    for ignore_file in &options.ignore_files {
        if let Some(e) = builder.add_ignore(ignore_file) {
            tracing::warn!(file = %ignore_file, error = %e, "Could not load ignore file");
        }
    }

    for entry in builder.build() {
        let entry = entry?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(NormalizedPath::new(entry.path()));
        }
    }
    Ok(())
}

fn globs(dir: &NormalizedPath, options: &Options) -> Result<Override> {
    let mut overrides = OverrideBuilder::new(dir.to_native());
    for pattern in &options.include {
        overrides.add(pattern)?;
    }
    for pattern in &options.exclude {
        overrides.add(&format!("!{}", pattern))?;
    }
    Ok(overrides.build()?)
}
