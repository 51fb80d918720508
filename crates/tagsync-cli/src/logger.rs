//! Terminal and JSON renderings of run diagnostics

use colored::Colorize;
use serde::Serialize;
use tagsync_core::{ExitCode, LogLevel, Logger, Summary};
use tagsync_fs::NormalizedPath;
use tagsync_tags::ErrorDetails;

/// Shorten `file` to a path relative to `cwd` when it lies below it.
pub fn display_path(cwd: &NormalizedPath, file: &str) -> String {
    NormalizedPath::new(file)
        .relative_to(cwd)
        .unwrap_or_else(|| file.to_string())
}

/// Colored `file:line: level: message` lines and a closing summary.
pub struct HumanLogger {
    cwd: NormalizedPath,
}

impl HumanLogger {
    pub fn new(cwd: NormalizedPath) -> Self {
        Self { cwd }
    }
}

impl Logger for HumanLogger {
    fn log(&mut self, level: LogLevel, file: &str, message: &str, line: Option<usize>) {
        let location = match line {
            Some(line) => format!("{}:{}:", display_path(&self.cwd, file), line),
            None => format!("{}:", display_path(&self.cwd, file)),
        };
        let label = match level {
            LogLevel::Info => "would fix:".cyan().bold(),
            LogLevel::Fixed => "fixed:".green().bold(),
            LogLevel::Warning => "warning:".yellow().bold(),
            LogLevel::Error => "error:".red().bold(),
        };
        println!("{} {} {}", location.bold(), label, message);
    }

    fn finish(&mut self, summary: &Summary) {
        if summary.files_checked == 0 {
            return;
        }
        let files = plural(summary.files_checked, "file");
        match summary.exit_code() {
            ExitCode::Success if summary.files_fixed > 0 => println!(
                "{} Fixed {} ({}), {} checked",
                "OK".green().bold(),
                plural(summary.files_fixed, "file"),
                plural(summary.fixes_applied, "change"),
                files
            ),
            ExitCode::Success => println!("{} {} in sync", "OK".green().bold(), files),
            ExitCode::Desynchronized => {
                println!(
                    "{} {} in {}",
                    "DESYNCHRONIZED".yellow().bold(),
                    plural(summary.fixable_errors, "fixable error"),
                    files
                );
                println!("Run {} to repair.", "tagsync fix".cyan());
            }
            _ => println!(
                "{} {} and {} in {}",
                "FAILED".red().bold(),
                plural(summary.unfixable_errors, "unfixable error"),
                plural(summary.fixable_errors, "fixable error"),
                files
            ),
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// One logged message in the JSON report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub file: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Collects entries for a single JSON document printed after the run.
pub struct JsonLogger {
    cwd: NormalizedPath,
    entries: Vec<Entry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    exit_code: i32,
    summary: &'a Summary,
    diagnostics: &'a [Entry],
}

impl JsonLogger {
    pub fn new(cwd: NormalizedPath) -> Self {
        Self {
            cwd,
            entries: Vec::new(),
        }
    }

    /// Render the report for a finished run.
    pub fn render(&self, exit_code: ExitCode, summary: &Summary) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Report {
            exit_code: exit_code.code(),
            summary,
            diagnostics: &self.entries,
        })
    }
}

impl Logger for JsonLogger {
    fn log(&mut self, level: LogLevel, file: &str, message: &str, line: Option<usize>) {
        self.entries.push(Entry {
            file: display_path(&self.cwd, file),
            level,
            message: message.to_string(),
            line,
            error: None,
        });
    }

    fn diagnostic(&mut self, file: &str, error: &ErrorDetails) {
        let level = if error.is_fixable() {
            LogLevel::Warning
        } else {
            LogLevel::Error
        };
        self.entries.push(Entry {
            file: display_path(&self.cwd, file),
            level,
            message: error.reason.clone(),
            line: error.line(),
            error: Some(error.clone()),
        });
    }
}
