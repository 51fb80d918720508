//! The per-file tag state machine.
//!
//! Each marker id is either absent or open. Lines are fed one at a time:
//! start tags open a marker and record a target, end tags complete it and
//! every other line is appended to all open markers. Problems are reported
//! through [`ParseHandler::on_error`] and never stop the parse.
//!
//! ```
//! use tagsync_tags::{
//!     CompletedMarker, ErrorDetails, ParseHandler, ResolvedTarget, TagParser, TagSyntax,
//!     TargetKind,
//! };
//!
//! #[derive(Default)]
//! struct Collect(Vec<CompletedMarker>, Vec<ErrorDetails>);
//!
//! impl ParseHandler for Collect {
//!     fn on_error(&mut self, error: ErrorDetails) {
//!         self.1.push(error);
//!     }
//!     fn on_marker(&mut self, marker: CompletedMarker) {
//!         self.0.push(marker);
//!     }
//! }
//!
//! let syntax = TagSyntax::default();
//! let resolver = |r: &str| ResolvedTarget {
//!     kind: TargetKind::Local { path: format!("/repo/{r}") },
//!     exists: true,
//! };
//! let mut parser = TagParser::new(&syntax, resolver);
//! let mut out = Collect::default();
//! for line in ["// sync-start:a b.rs\n", "body\n", "// sync-end:a\n"] {
//!     parser.feed(line, &mut out);
//! }
//! assert_eq!(parser.finish(&mut out), 3);
//! assert!(out.1.is_empty());
//! assert_eq!(out.0[0].content, vec!["body\n".to_string()]);
//! ```

use std::collections::BTreeMap;

use tagsync_fs::io::split_terminator;

use crate::diagnostic::{ErrorCode, ErrorDetails, FixAction, Location};
use crate::syntax::{CommentSyntax, EndTag, StartTag, TagLine, TagSyntax};
use crate::target::{Target, TargetKind, TargetResolver};

/// Receives parse results.
pub trait ParseHandler {
    fn on_error(&mut self, error: ErrorDetails);
    fn on_marker(&mut self, marker: CompletedMarker);
}

/// A marker whose end tag was reached.
///
/// An end tag without a start produces a completed marker with no content
/// and no targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMarker {
    pub id: String,
    /// Content lines with their original terminators.
    pub content: Vec<String>,
    /// Targets keyed by 1-based declaration line.
    pub targets: BTreeMap<usize, Target>,
    pub comment: CommentSyntax,
    /// Line of the end tag.
    pub end_line: usize,
}

impl CompletedMarker {
    /// Line of the first declaration, or the end tag for orphans.
    pub fn first_line(&self) -> usize {
        self.targets.keys().next().copied().unwrap_or(self.end_line)
    }
}

#[derive(Debug)]
struct OpenMarker {
    content: Vec<String>,
    targets: BTreeMap<usize, Target>,
    comment: CommentSyntax,
}

/// Line-driven tag parser for one input.
pub struct TagParser<'s, R> {
    syntax: &'s TagSyntax,
    resolver: R,
    line: usize,
    open: BTreeMap<String, OpenMarker>,
}

impl<'s, R: TargetResolver> TagParser<'s, R> {
    pub fn new(syntax: &'s TagSyntax, resolver: R) -> Self {
        Self {
            syntax,
            resolver,
            line: 0,
            open: BTreeMap::new(),
        }
    }

    /// Feed one raw line, terminator included.
    pub fn feed<H: ParseHandler>(&mut self, raw: &str, handler: &mut H) {
        self.line += 1;
        let (text, _) = split_terminator(raw);
        match self.syntax.classify(text) {
            TagLine::Start(tag) => self.on_start(tag, text, handler),
            TagLine::End(tag) => self.on_end(tag, handler),
            TagLine::MalformedStart { id, reason } => handler.on_error(
                ErrorDetails::new(
                    ErrorCode::MalformedStartTag,
                    id,
                    format!("Malformed sync-start tag: {}", reason),
                )
                .at(Location::line(self.line)),
            ),
            TagLine::MalformedEnd { id, reason } => handler.on_error(
                ErrorDetails::new(
                    ErrorCode::MalformedEndTag,
                    id,
                    format!("Malformed sync-end tag: {}", reason),
                )
                .at(Location::line(self.line)),
            ),
            TagLine::Content => {
                for marker in self.open.values_mut() {
                    marker.content.push(raw.to_string());
                }
            }
        }
    }

    /// Close the input, reporting markers left open.
    ///
    /// Returns the number of lines parsed.
    pub fn finish<H: ParseHandler>(self, handler: &mut H) -> usize {
        for (id, marker) in &self.open {
            for line in marker.targets.keys() {
                handler.on_error(
                    ErrorDetails::new(
                        ErrorCode::StartTagWithoutEndTag,
                        Some(id.as_str()),
                        format!("Start tag for '{}' has no matching end tag", id),
                    )
                    .at(Location::line(*line)),
                );
            }
        }
        self.line
    }

    fn on_start<H: ParseHandler>(&mut self, tag: StartTag<'_>, text: &str, handler: &mut H) {
        let line = self.line;
        let id = tag.id;
        let comment = tag.comment_syntax();
        let resolved = self.resolver.resolve(tag.target);
        let span = Location::span(
            line,
            tag.target_offset + 1,
            tag.target_offset + tag.target.len(),
        );

        let marker = self
            .open
            .entry(id.to_string())
            .or_insert_with(|| OpenMarker {
                content: Vec::new(),
                targets: BTreeMap::new(),
                comment: comment.clone(),
            });

        if matches!(resolved.kind, TargetKind::Local { .. }) && !resolved.exists {
            handler.on_error(
                ErrorDetails::new(
                    ErrorCode::FileDoesNotExist,
                    Some(id),
                    format!("Target file '{}' does not exist", tag.target),
                )
                .at(span),
            );
        }

        if marker.targets.values().any(|t| t.kind == resolved.kind) {
            handler.on_error(
                ErrorDetails::new(
                    ErrorCode::DuplicateTarget,
                    Some(id),
                    format!("Duplicate target '{}' for '{}'", tag.target, id),
                )
                .at(span)
                .with_fix(FixAction::Delete {
                    line,
                    description: format!("Removed duplicate target '{}' of '{}'", tag.target, id),
                    declaration: text.to_string(),
                }),
            );
        }

        if marker.comment != comment {
            handler.on_error(
                ErrorDetails::new(
                    ErrorCode::DifferentCommentSyntax,
                    Some(id),
                    format!(
                        "Marker '{}' uses '{}' but was first declared with '{}'",
                        id, comment, marker.comment
                    ),
                )
                .at(Location::line(line)),
            );
        }

        if !marker.content.is_empty() {
            handler.on_error(
                ErrorDetails::new(
                    ErrorCode::StartTagAfterContent,
                    Some(id),
                    format!("Start tag for '{}' appears after content", id),
                )
                .at(Location::line(line)),
            );
        }

        marker.targets.insert(
            line,
            Target {
                reference: tag.target.to_string(),
                kind: resolved.kind,
                checksum: tag.checksum.map(str::to_string),
                declaration: text.to_string(),
            },
        );
    }

    fn on_end<H: ParseHandler>(&mut self, tag: EndTag<'_>, handler: &mut H) {
        let line = self.line;
        match self.open.remove(tag.id) {
            Some(open) => handler.on_marker(CompletedMarker {
                id: tag.id.to_string(),
                content: open.content,
                targets: open.targets,
                comment: open.comment,
                end_line: line,
            }),
            None => {
                handler.on_error(
                    ErrorDetails::new(
                        ErrorCode::EndTagWithoutStartTag,
                        Some(tag.id),
                        format!("End tag for '{}' has no matching start tag", tag.id),
                    )
                    .at(Location::line(line)),
                );
                handler.on_marker(CompletedMarker {
                    id: tag.id.to_string(),
                    content: Vec::new(),
                    targets: BTreeMap::new(),
                    comment: tag.comment_syntax(),
                    end_line: line,
                });
            }
        }
    }
}
