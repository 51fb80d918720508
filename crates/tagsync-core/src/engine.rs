//! End-to-end run: enumerate, build the cache, check, report or fix

use tagsync_fs::NormalizedPath;

use crate::Result;
use crate::cache::CacheBuilder;
use crate::check::ErrorGenerator;
use crate::files::enumerate;
use crate::model::MarkerCache;
use crate::options::{CacheMode, CacheOptions, Options};
use crate::persist;
use crate::sink::{ExitCode, Logger, OutputSink, SinkOptions, Summary};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome<L> {
    pub exit_code: ExitCode,
    pub summary: Summary,
    pub logger: L,
}

/// Drives one run with fixed options.
pub struct Engine<'o> {
    options: &'o Options,
}

impl<'o> Engine<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self { options }
    }

    /// Enumerate `paths` and build the cache. `None` when no file matched.
    pub fn build_cache(&self, paths: &[NormalizedPath]) -> Result<Option<MarkerCache>> {
        let files = enumerate(paths, self.options)?;
        if files.is_empty() {
            return Ok(None);
        }
        Ok(Some(CacheBuilder::new(self.options).build(&files)))
    }

    /// Run the whole pipeline, reporting through `logger`.
    ///
    /// A read-mode cache replaces scanning; a write-mode cache is persisted
    /// and checking is skipped.
    pub fn run<L: Logger>(&self, paths: &[NormalizedPath], mut logger: L) -> Result<RunOutcome<L>> {
        let cache = match &self.options.cache {
            Some(CacheOptions {
                mode: CacheMode::Read,
                path,
            }) => persist::load(path)?,
            _ => match self.build_cache(paths)? {
                Some(cache) => cache,
                None => {
                    let summary = Summary::default();
                    logger.finish(&summary);
                    return Ok(RunOutcome {
                        exit_code: ExitCode::NoMatchingFiles,
                        summary,
                        logger,
                    });
                }
            },
        };

        if let Some(CacheOptions {
            mode: CacheMode::Write,
            path,
        }) = &self.options.cache
        {
            persist::save(&cache, path)?;
            let summary = Summary::default();
            logger.finish(&summary);
            return Ok(RunOutcome {
                exit_code: ExitCode::Success,
                summary,
                logger,
            });
        }

        let reports = ErrorGenerator::new(self.options).generate(&cache);
        let mut sink = OutputSink::new(
            SinkOptions {
                auto_fix: self.options.auto_fix,
                dry_run: self.options.dry_run,
            },
            logger,
        );
        for report in reports {
            sink.start_file(&NormalizedPath::new(&report.path))?;
            for error in report.errors {
                sink.push(error)?;
            }
            sink.end_file()?;
        }

        let (summary, logger) = sink.finish()?;
        Ok(RunOutcome {
            exit_code: summary.exit_code(),
            summary,
            logger,
        })
    }
}
