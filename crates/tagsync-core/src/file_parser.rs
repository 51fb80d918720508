//! Parsing a single file into a [`FileInfo`]

use std::path::Path;

use tagsync_fs::checksum::{content_checksum, self_checksum};
use tagsync_fs::io::open_lines;
use tagsync_fs::NormalizedPath;
use tagsync_tags::{
    CompletedMarker, ErrorCode, ErrorDetails, Location, ParseHandler, ResolvedTarget, TagParser,
    TagSyntax, TargetKind, is_remote,
};

use crate::model::{FileInfo, Marker};
use crate::options::Options;

/// Nearest ancestor of `file` containing `root_marker`, else its directory.
pub fn find_root(file: &NormalizedPath, root_marker: &str) -> NormalizedPath {
    let start = file.parent().unwrap_or_else(|| NormalizedPath::new("."));
    let mut dir = Some(start.clone());
    while let Some(current) = dir {
        if current.join(root_marker).exists() {
            return current;
        }
        dir = current.parent();
    }
    start
}

/// Resolve a target reference written in a file with logical `root`.
pub fn resolve_target(root: &NormalizedPath, reference: &str) -> ResolvedTarget {
    if is_remote(reference) {
        return ResolvedTarget {
            kind: TargetKind::Remote {
                url: reference.to_string(),
            },
            exists: true,
        };
    }
    let path = if Path::new(reference).is_absolute() || reference.starts_with('/') {
        NormalizedPath::new(reference)
    } else {
        root.join(reference)
    };
    ResolvedTarget {
        exists: path.is_file(),
        kind: TargetKind::Local {
            path: path.as_str().to_string(),
        },
    }
}

/// Outcome of parsing one file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub info: FileInfo,
    /// Existing local targets worth parsing next. Always empty for
    /// read-only files.
    pub referenced: Vec<NormalizedPath>,
}

/// Parses files with one set of options.
pub struct FileParser<'o> {
    options: &'o Options,
    syntax: TagSyntax,
}

impl<'o> FileParser<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            syntax: options.syntax(),
        }
    }

    /// Parse the file at canonical `path`.
    ///
    /// I/O failures never propagate: they leave a single `couldNotParse`
    /// error and no markers.
    pub fn parse(&self, path: &NormalizedPath, read_only: bool) -> ParsedFile {
        let root = find_root(path, &self.options.root_marker);
        let relative = path
            .relative_to(&root)
            .unwrap_or_else(|| path.as_str().to_string());

        let mut collector = Collector {
            info: FileInfo::new(path.as_str(), root.as_str(), read_only),
            path,
            relative: &relative,
            allow_empty: self.options.allow_empty_tags,
            referenced: Vec::new(),
        };

        let mut reader = match open_lines(path) {
            Ok(reader) => reader,
            Err(e) => return could_not_parse(path, &root, read_only, e),
        };
        let mut parser = TagParser::new(&self.syntax, |reference: &str| {
            resolve_target(&root, reference)
        });

        loop {
            match reader.next_line() {
                Ok(Some(line)) => parser.feed(&line.raw(), &mut collector),
                Ok(None) => break,
                Err(e) => return could_not_parse(path, &root, read_only, e),
            }
        }
        let lines = parser.finish(&mut collector);

        let mut info = collector.info;
        info.line_count = Some(lines);
        let referenced = if read_only {
            Vec::new()
        } else {
            collector.referenced
        };
        tracing::debug!(
            path = %path,
            markers = info.markers.len(),
            errors = info.errors.len(),
            "Parsed file"
        );
        ParsedFile { info, referenced }
    }
}

fn could_not_parse(
    path: &NormalizedPath,
    root: &NormalizedPath,
    read_only: bool,
    error: impl std::fmt::Display,
) -> ParsedFile {
    tracing::warn!(path = %path, error = %error, "Could not parse file");
    let mut info = FileInfo::new(path.as_str(), root.as_str(), read_only);
    info.errors.push(ErrorDetails::new(
        ErrorCode::CouldNotParse,
        None,
        format!("Could not parse '{}': {}", path, error),
    ));
    ParsedFile {
        info,
        referenced: Vec::new(),
    }
}

struct Collector<'a> {
    info: FileInfo,
    path: &'a NormalizedPath,
    relative: &'a str,
    allow_empty: bool,
    referenced: Vec<NormalizedPath>,
}

impl Collector<'_> {
    fn targets_self(&self, target_path: &str) -> bool {
        if target_path == self.path.as_str() {
            return true;
        }
        NormalizedPath::new(target_path)
            .canonicalize()
            .is_ok_and(|real| &real == self.path)
    }
}

impl ParseHandler for Collector<'_> {
    fn on_error(&mut self, error: ErrorDetails) {
        self.info.errors.push(error);
    }

    fn on_marker(&mut self, marker: CompletedMarker) {
        let CompletedMarker {
            id,
            content,
            targets,
            comment,
            ..
        } = &marker;
        let first_line = marker.first_line();

        let built = Marker {
            content_checksum: content_checksum(content.as_slice()),
            self_checksum: self_checksum(content.as_slice(), self.relative),
            comment_start: comment.start.clone(),
            comment_end: comment.end.clone(),
            targets: targets.clone(),
        };

        // An orphan end tag only records that the id occurred
        if targets.is_empty() {
            self.info.markers.entry(id.clone()).or_insert(built);
            return;
        }

        for (line, target) in targets {
            if let TargetKind::Local { path } = &target.kind {
                if self.targets_self(path) {
                    self.info.errors.push(
                        ErrorDetails::new(
                            ErrorCode::SelfTargeting,
                            Some(id.as_str()),
                            format!("Marker '{}' targets its own file", id),
                        )
                        .at(Location::line(*line)),
                    );
                } else {
                    let path = NormalizedPath::new(path);
                    if path.is_file() && !self.referenced.contains(&path) {
                        self.referenced.push(path);
                    }
                }
            }
        }

        let duplicate = self
            .info
            .markers
            .get(id)
            .is_some_and(|existing| !existing.targets.is_empty());
        if duplicate {
            self.info.errors.push(
                ErrorDetails::new(
                    ErrorCode::DuplicateMarker,
                    Some(id.as_str()),
                    format!("Marker '{}' is declared more than once", id),
                )
                .at(Location::line(first_line)),
            );
        }

        if content.is_empty() && !self.allow_empty {
            self.info.errors.push(
                ErrorDetails::new(
                    ErrorCode::EmptyMarker,
                    Some(id.as_str()),
                    format!("Marker '{}' has no content", id),
                )
                .at(Location::line(first_line)),
            );
        }

        self.info.markers.insert(id.clone(), built);
    }
}
