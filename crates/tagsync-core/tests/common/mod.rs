//! Helpers shared by the integration tests.

#![allow(dead_code)]

use tagsync_core::{
    CacheBuilder, ErrorGenerator, FileErrors, LogLevel, Logger, MarkerCache, Options,
};
use tagsync_fs::NormalizedPath;
use tagsync_tags::ErrorCode;

/// Logger that keeps every message.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    pub entries: Vec<(LogLevel, String, String, Option<usize>)>,
}

impl Logger for MemoryLogger {
    fn log(&mut self, level: LogLevel, file: &str, message: &str, line: Option<usize>) {
        self.entries
            .push((level, file.to_string(), message.to_string(), line));
    }
}

pub fn build(options: &Options, files: &[NormalizedPath]) -> MarkerCache {
    CacheBuilder::new(options).build(files)
}

pub fn check(options: &Options, files: &[NormalizedPath]) -> Vec<FileErrors> {
    let cache = build(options, files);
    ErrorGenerator::new(options).generate(&cache)
}

pub fn errors_for<'a>(reports: &'a [FileErrors], path: &NormalizedPath) -> &'a FileErrors {
    reports
        .iter()
        .find(|r| r.path == path.as_str())
        .unwrap_or_else(|| panic!("no report for {}", path))
}

pub fn codes(report: &FileErrors) -> Vec<ErrorCode> {
    report.errors.iter().map(|e| e.code).collect()
}
