//! Two-phase cache construction
//!
//! Phase one parses the requested files as writable. Phase two drains a
//! worklist of files they reference, parsing each canonical path once as
//! read-only. The "already cached" check on canonical paths is what makes
//! reference cycles terminate.

use std::collections::VecDeque;

use tagsync_fs::NormalizedPath;
use tagsync_tags::{ErrorCode, ErrorDetails};

use crate::file_parser::FileParser;
use crate::model::{FileInfo, MarkerCache};
use crate::options::Options;

pub struct CacheBuilder<'o> {
    parser: FileParser<'o>,
}

impl<'o> CacheBuilder<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            parser: FileParser::new(options),
        }
    }

    /// Build the cache for `files` and everything they transitively
    /// reference.
    pub fn build(&self, files: &[NormalizedPath]) -> MarkerCache {
        let mut cache = MarkerCache::new();
        let mut pending = VecDeque::new();

        for file in files {
            self.visit(&mut cache, file, false, &mut pending);
        }
        tracing::debug!(
            requested = files.len(),
            referenced = pending.len(),
            "Parsed requested files"
        );

        while let Some(next) = pending.pop_front() {
            self.visit(&mut cache, &next, true, &mut pending);
        }
        cache
    }

    fn visit(
        &self,
        cache: &mut MarkerCache,
        given: &NormalizedPath,
        read_only: bool,
        pending: &mut VecDeque<NormalizedPath>,
    ) {
        let canonical = match given.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                if !cache.contains(given.as_str()) {
                    tracing::warn!(path = %given, error = %e, "Could not resolve path");
                    cache.insert(given.as_str(), unresolvable(given, read_only, &e));
                }
                return;
            }
        };

        if !cache.contains(canonical.as_str()) {
            let parsed = self.parser.parse(&canonical, read_only);
            cache.insert(canonical.as_str(), parsed.info);
            pending.extend(parsed.referenced);
        }
        if &canonical != given {
            cache.add_alias(canonical.as_str(), given.as_str());
        }
    }
}

fn unresolvable(path: &NormalizedPath, read_only: bool, error: &std::io::Error) -> FileInfo {
    let root = path.parent().unwrap_or_else(|| path.clone());
    let mut info = FileInfo::new(path.as_str(), root.as_str(), read_only);
    info.errors.push(ErrorDetails::new(
        ErrorCode::CouldNotParse,
        None,
        format!("Could not resolve '{}': {}", path, error),
    ));
    info
}
