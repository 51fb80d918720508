//! Per-file aggregation of errors and the fix decision
//!
//! The [`OutputSink`] receives errors one file at a time. When a file ends
//! it either applies every fix (auto-fix enabled and all errors fixable) or
//! reports every error to the [`Logger`]. A file is never partially fixed.

use serde::Serialize;
use tagsync_fs::NormalizedPath;
use tagsync_tags::{ErrorCode, ErrorDetails, FixAction};

use crate::fix::apply_fixes;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// A fix previewed by a dry run.
    Info,
    /// A fix written to disk.
    Fixed,
    Warning,
    Error,
}

/// Position-aware message receiver. Formatting belongs to implementors.
pub trait Logger {
    fn log(&mut self, level: LogLevel, file: &str, message: &str, line: Option<usize>);

    /// Called with the full error of each reported diagnostic.
    fn diagnostic(&mut self, file: &str, error: &ErrorDetails) {
        let level = if error.is_fixable() {
            LogLevel::Warning
        } else {
            LogLevel::Error
        };
        self.log(level, file, &error.reason, error.line());
    }

    /// Called once after the last file.
    fn finish(&mut self, _summary: &Summary) {}
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitCode {
    Success,
    Fatal,
    NoMatchingFiles,
    UnfixableErrors,
    Desynchronized,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Fatal => 1,
            Self::NoMatchingFiles => 2,
            Self::UnfixableErrors => 3,
            Self::Desynchronized => 4,
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files_checked: usize,
    pub files_fixed: usize,
    pub fixes_applied: usize,
    /// Fixable errors reported but not written to disk.
    pub fixable_errors: usize,
    pub unfixable_errors: usize,
}

impl Summary {
    pub fn exit_code(&self) -> ExitCode {
        if self.unfixable_errors > 0 {
            ExitCode::UnfixableErrors
        } else if self.fixable_errors > 0 {
            ExitCode::Desynchronized
        } else {
            ExitCode::Success
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkOptions {
    pub auto_fix: bool,
    pub dry_run: bool,
}

struct ActiveFile {
    path: NormalizedPath,
    errors: Vec<ErrorDetails>,
}

pub struct OutputSink<L> {
    options: SinkOptions,
    logger: L,
    active: Option<ActiveFile>,
    summary: Summary,
}

impl<L: Logger> OutputSink<L> {
    pub fn new(options: SinkOptions, logger: L) -> Self {
        Self {
            options,
            logger,
            active: None,
            summary: Summary::default(),
        }
    }

    /// Begin collecting errors for `path`.
    ///
    /// Fails if the previous file was not ended.
    pub fn start_file(&mut self, path: &NormalizedPath) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(Error::sink_misuse(format!(
                "cannot start '{}' while '{}' is active",
                path, active.path
            )));
        }
        self.active = Some(ActiveFile {
            path: path.clone(),
            errors: Vec::new(),
        });
        Ok(())
    }

    pub fn push(&mut self, error: ErrorDetails) -> Result<()> {
        match &mut self.active {
            Some(active) => {
                active.errors.push(error);
                Ok(())
            }
            None => Err(Error::sink_misuse("error pushed with no active file")),
        }
    }

    /// Finish the active file: fix it or report its errors.
    pub fn end_file(&mut self) -> Result<()> {
        let Some(ActiveFile { path, errors }) = self.active.take() else {
            return Err(Error::sink_misuse("end_file called with no active file"));
        };
        self.summary.files_checked += 1;
        if errors.is_empty() {
            return Ok(());
        }

        let file = path.as_str();
        let all_fixable = errors.iter().all(ErrorDetails::is_fixable);
        if !(self.options.auto_fix && all_fixable) {
            for error in &errors {
                if error.is_fixable() {
                    self.summary.fixable_errors += 1;
                } else {
                    self.summary.unfixable_errors += 1;
                }
                self.logger.diagnostic(file, error);
            }
            return Ok(());
        }

        let fixes: Vec<FixAction> = errors.iter().filter_map(|e| e.fix.clone()).collect();
        match apply_fixes(&path, &fixes, self.options.dry_run) {
            Ok(applied) => {
                for fix in &fixes {
                    let (level, message) = if self.options.dry_run {
                        (LogLevel::Info, format!("Would apply: {}", fix.description()))
                    } else {
                        (LogLevel::Fixed, fix.description().to_string())
                    };
                    self.logger.log(level, file, &message, Some(fix.line()));
                }
                if self.options.dry_run {
                    self.summary.fixable_errors += errors.len();
                } else {
                    self.summary.files_fixed += 1;
                    self.summary.fixes_applied += applied;
                }
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Could not fix file");
                let error = ErrorDetails::new(
                    ErrorCode::CouldNotParse,
                    None,
                    format!("Could not fix '{}': {}", path, e),
                );
                self.summary.unfixable_errors += 1;
                self.logger.diagnostic(file, &error);
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Close the sink, returning the summary and the logger.
    ///
    /// Fails if a file is still active.
    pub fn finish(mut self) -> Result<(Summary, L)> {
        if let Some(active) = &self.active {
            return Err(Error::sink_misuse(format!(
                "'{}' was never ended",
                active.path
            )));
        }
        self.logger.finish(&self.summary);
        Ok((self.summary, self.logger))
    }
}
