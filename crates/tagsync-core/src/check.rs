//! Cross-file consistency checking
//!
//! For every writable cache entry the [`ErrorGenerator`] re-surfaces parse
//! errors and compares each declaration's recorded checksum with the
//! authoritative one:
//!
//! - a local target is checked against the same-id marker in the target
//!   file, provided that marker declares a return target naming this file;
//! - a remote target is checked against the declaring marker's own self
//!   checksum.
//!
//! Declarations without a return tag are migrated when a mapping applies,
//! and reported as `noReturnTag` otherwise.

use serde::Serialize;
use tagsync_fs::NormalizedPath;
use tagsync_fs::checksum::NO_CHECKSUM;
use tagsync_tags::{
    ErrorCode, ErrorDetails, FixAction, Location, TagSyntax, Target, TargetKind,
    rewrite_checksum, rewrite_target,
};

use crate::migration::MigrationResolver;
use crate::model::{FileInfo, Marker, MarkerCache};
use crate::options::{MigrationMode, Options};

/// Errors generated for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileErrors {
    pub path: String,
    pub errors: Vec<ErrorDetails>,
}

pub struct ErrorGenerator<'o> {
    options: &'o Options,
    syntax: TagSyntax,
}

impl<'o> ErrorGenerator<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            syntax: options.syntax(),
        }
    }

    /// Check every writable entry of `cache`, in path order.
    pub fn generate(&self, cache: &MarkerCache) -> Vec<FileErrors> {
        cache
            .fixable()
            .map(|(path, info)| FileErrors {
                path: path.to_string(),
                errors: self.check_file(cache, info),
            })
            .collect()
    }

    /// Errors for one file, ordered by line.
    pub fn check_file(&self, cache: &MarkerCache, info: &FileInfo) -> Vec<ErrorDetails> {
        let root = NormalizedPath::new(&info.root);
        let migration = MigrationResolver::new(&self.options.migration);
        let mut errors = Vec::new();

        for error in &info.errors {
            if error.code == ErrorCode::FileDoesNotExist
                && self.migrates(info, &root, migration, error).is_some()
            {
                continue;
            }
            errors.push(error.clone());
        }

        for (id, marker) in &info.markers {
            for (line, target) in &marker.targets {
                let decl = Declaration {
                    id,
                    marker,
                    line: *line,
                    target,
                };
                let error = match &target.kind {
                    TargetKind::Local { path } => {
                        let migrated = migration.resolve_target(&root, path);
                        self.check_local(cache, info, &decl, path, migrated)
                    }
                    TargetKind::Remote { .. } => {
                        self.check_checksum(&decl, &marker.self_checksum)
                    }
                };
                errors.extend(error);
            }
        }

        errors.sort_by_key(|e| e.line().unwrap_or(0));
        errors
    }

    fn migrates(
        &self,
        info: &FileInfo,
        root: &NormalizedPath,
        migration: MigrationResolver<'_>,
        error: &ErrorDetails,
    ) -> Option<String> {
        let marker = info.markers.get(error.marker_id.as_deref()?)?;
        let target = marker.targets.get(&error.line()?)?;
        migration.resolve_target(root, target.kind.local_path()?)
    }

    fn check_local(
        &self,
        cache: &MarkerCache,
        info: &FileInfo,
        decl: &Declaration<'_>,
        path: &str,
        migrated: Option<String>,
    ) -> Option<ErrorDetails> {
        if self.options.migration.mode == MigrationMode::All {
            if let Some(migrated) = &migrated {
                return Some(self.pending_migration(decl, migrated));
            }
        }

        match return_marker(cache, info, decl.id, path) {
            Some(other) => self.check_checksum(decl, &other.content_checksum),
            None => match &migrated {
                Some(migrated) => Some(self.pending_migration(decl, migrated)),
                None => Some(
                    ErrorDetails::new(
                        ErrorCode::NoReturnTag,
                        Some(decl.id),
                        format!(
                            "No return tag named '{}' in '{}'",
                            decl.id, decl.target.reference
                        ),
                    )
                    .at(Location::line(decl.line)),
                ),
            },
        }
    }

    fn check_checksum(&self, decl: &Declaration<'_>, expected: &str) -> Option<ErrorDetails> {
        let Declaration {
            id, line, target, ..
        } = *decl;
        let recorded = target.checksum.as_deref().unwrap_or(NO_CHECKSUM);
        if recorded == expected {
            return None;
        }

        let mut error = ErrorDetails::new(
            ErrorCode::MismatchedChecksum,
            Some(id),
            format!(
                "Checksum of '{}' for '{}' is '{}' but '{}' was expected",
                id, target.reference, recorded, expected
            ),
        )
        .at(Location::line(line));

        let rendered = if expected == NO_CHECKSUM { "" } else { expected };
        if let Some(text) = rewrite_checksum(&self.syntax, &target.declaration, rendered) {
            error = error.with_fix(FixAction::Replace {
                line,
                text,
                description: format!(
                    "Updated checksum of '{}' for '{}' to '{}'",
                    id, target.reference, expected
                ),
                declaration: target.declaration.clone(),
            });
        }
        Some(error)
    }

    fn pending_migration(&self, decl: &Declaration<'_>, migrated: &str) -> ErrorDetails {
        let Declaration {
            id,
            marker,
            line,
            target,
        } = *decl;
        let mut error = ErrorDetails::new(
            ErrorCode::PendingMigration,
            Some(id),
            format!(
                "Target '{}' of '{}' has moved to '{}'",
                target.reference, id, migrated
            ),
        )
        .at(Location::line(line));

        if let Some(text) = rewrite_target(
            &self.syntax,
            &target.declaration,
            migrated,
            &marker.self_checksum,
        ) {
            error = error.with_fix(FixAction::Replace {
                line,
                text,
                description: format!(
                    "Migrated target of '{}' from '{}' to '{}'",
                    id, target.reference, migrated
                ),
                declaration: target.declaration.clone(),
            });
        }
        error
    }
}

/// One target declaration of a marker.
#[derive(Clone, Copy)]
struct Declaration<'a> {
    id: &'a str,
    marker: &'a Marker,
    line: usize,
    target: &'a Target,
}

/// The same-id marker in `path` that declares a target naming `info`.
fn return_marker<'c>(
    cache: &'c MarkerCache,
    info: &FileInfo,
    id: &str,
    path: &str,
) -> Option<&'c Marker> {
    let other = cache.get(path)?.markers.get(id)?;
    other
        .targets
        .values()
        .any(|t| t.kind.local_path().is_some_and(|p| info.is_alias(p)))
        .then_some(other)
}
