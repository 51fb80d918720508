//! Consistency engine for tagsync
//!
//! This crate turns files containing sync tags into a [`MarkerCache`],
//! checks every declaration against its counterpart and repairs stale
//! declaration lines.
//!
//! - **Cache building**: [`FileParser`] parses one file, [`CacheBuilder`]
//!   parses the requested files and, transitively, every file they target
//! - **Checking**: [`ErrorGenerator`] compares recorded and authoritative
//!   checksums and resolves migrations through [`MigrationResolver`]
//! - **Fixing**: [`OutputSink`] decides per file between reporting and
//!   fixing; [`fix::apply_fixes`] streams the replacement to disk
//!
//! # Architecture
//!
//! ```text
//!                  tagsync-cli
//!                       |
//!                  tagsync-core
//!                   /        \
//!           tagsync-tags   tagsync-fs
//! ```
//!
//! Data flows one way: the cache is built once, read by the generator and
//! the generator's output is consumed by the sink.
//!
//! # Example
//!
//! ```no_run
//! use tagsync_core::{Engine, LogLevel, Logger, Options};
//! use tagsync_fs::NormalizedPath;
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn log(&mut self, _level: LogLevel, file: &str, message: &str, line: Option<usize>) {
//!         eprintln!("{}:{}: {}", file, line.unwrap_or(0), message);
//!     }
//! }
//!
//! fn check() -> tagsync_core::Result<i32> {
//!     let options = Options::default();
//!     let outcome = Engine::new(&options).run(&[NormalizedPath::new(".")], Stderr)?;
//!     Ok(outcome.exit_code.code())
//! }
//! ```

pub mod cache;
pub mod check;
pub mod engine;
pub mod error;
pub mod file_parser;
pub mod files;
pub mod fix;
pub mod migration;
pub mod model;
pub mod options;
pub mod persist;
pub mod sink;

pub use cache::CacheBuilder;
pub use check::{ErrorGenerator, FileErrors};
pub use engine::{Engine, RunOutcome};
pub use error::{Error, Result};
pub use file_parser::{FileParser, ParsedFile, find_root, resolve_target};
pub use migration::MigrationResolver;
pub use model::{FileInfo, Marker, MarkerCache};
pub use options::{
    CacheConfig, CacheMode, CacheOptions, Config, MigrationConfig, MigrationMapping,
    MigrationMode, MigrationOptions, Options,
};
pub use sink::{ExitCode, LogLevel, Logger, OutputSink, SinkOptions, Summary};
