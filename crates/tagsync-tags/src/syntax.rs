//! Line tokenizer for sync tags.
//!
//! A tag line has the shape:
//! ```text
//! <indent><comment>[ws]sync-start:<id> [<checksum>] <target> [<comment-end>]
//! <indent><comment>[ws]sync-end:<id> [<comment-end>]
//! ```
//!
//! The comment start is the longest configured prefix that matches after the
//! indentation. Everything before the keyword is kept as the tag's prefix and
//! everything after its last meaningful token as the suffix, so a rewritten
//! declaration keeps the original indentation and comment delimiters.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const START_KEYWORD: &str = "sync-start:";
pub const END_KEYWORD: &str = "sync-end:";

/// Comment starts recognized when nothing else is configured.
pub const DEFAULT_COMMENTS: &[&str] = &["//", "#", "<!--", "/*", "--", ";", "%", "'"];

/// Characters a trailing comment-end token may consist of.
const COMMENT_END_CHARS: &str = "-*/>}%#!";

static ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("Invalid marker id regex")
});

/// Check whether `id` is a valid marker id.
///
/// # Example
/// ```
/// use tagsync_tags::syntax::is_valid_id;
///
/// assert!(is_valid_id("docs.example-1"));
/// assert!(!is_valid_id("-leading-dash"));
/// ```
pub fn is_valid_id(id: &str) -> bool {
    ID_REGEX.is_match(id)
}

fn is_comment_end(token: &str) -> bool {
    !token.is_empty()
        && !token.starts_with('.')
        && token.chars().all(|c| COMMENT_END_CHARS.contains(c))
}

/// Comment delimiters of one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSyntax {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl std::fmt::Display for CommentSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{} ... {}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

/// A well-formed `sync-start` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Indentation, comment start and the gap before the keyword.
    pub prefix: &'a str,
    pub comment: &'a str,
    pub id: &'a str,
    pub checksum: Option<&'a str>,
    pub target: &'a str,
    /// Byte offset of the target within the line.
    pub target_offset: usize,
    /// Whitespace and comment end after the target, verbatim.
    pub suffix: &'a str,
    pub comment_end: Option<&'a str>,
}

impl StartTag<'_> {
    pub fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax {
            start: self.comment.to_string(),
            end: self.comment_end.map(str::to_string),
        }
    }

    /// Render this declaration with a new checksum and target.
    ///
    /// An empty checksum renders a declaration without one.
    pub fn render(&self, checksum: &str, target: &str) -> String {
        if checksum.is_empty() {
            format!("{}{}{} {}{}", self.prefix, START_KEYWORD, self.id, target, self.suffix)
        } else {
            format!(
                "{}{}{} {} {}{}",
                self.prefix, START_KEYWORD, self.id, checksum, target, self.suffix
            )
        }
    }
}

/// A well-formed `sync-end` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTag<'a> {
    pub comment: &'a str,
    pub id: &'a str,
    pub comment_end: Option<&'a str>,
}

impl EndTag<'_> {
    pub fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax {
            start: self.comment.to_string(),
            end: self.comment_end.map(str::to_string),
        }
    }
}

/// Classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLine<'a> {
    Start(StartTag<'a>),
    End(EndTag<'a>),
    /// A line carrying the start keyword that does not tokenize.
    MalformedStart { id: Option<&'a str>, reason: &'static str },
    /// A line carrying the end keyword that does not tokenize.
    MalformedEnd { id: Option<&'a str>, reason: &'static str },
    Content,
}

/// Tokenizer configured with the accepted comment starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSyntax {
    /// Sorted longest first so the longest match wins.
    comments: Vec<String>,
}

impl Default for TagSyntax {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENTS.iter().copied())
    }
}

impl TagSyntax {
    pub fn new<I, S>(comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut comments: Vec<String> = comments
            .into_iter()
            .map(Into::into)
            .filter(|c| !c.is_empty())
            .collect();
        comments.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        comments.dedup();
        Self { comments }
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Classify one line (without its terminator).
    ///
    /// # Example
    /// ```
    /// use tagsync_tags::syntax::{TagLine, TagSyntax};
    ///
    /// let syntax = TagSyntax::default();
    /// match syntax.classify("  // sync-start:demo 42 docs/a.md") {
    ///     TagLine::Start(tag) => {
    ///         assert_eq!(tag.id, "demo");
    ///         assert_eq!(tag.checksum, Some("42"));
    ///         assert_eq!(tag.target, "docs/a.md");
    ///     }
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// assert_eq!(syntax.classify("let x = 1;"), TagLine::Content);
    /// ```
    pub fn classify<'a>(&self, line: &'a str) -> TagLine<'a> {
        let trimmed = line.trim_start();
        let Some(comment) = self
            .comments
            .iter()
            .find(|c| trimmed.starts_with(c.as_str()))
        else {
            return TagLine::Content;
        };
        let body = trimmed[comment.len()..].trim_start();
        let keyword_offset = line.len() - body.len();
        let prefix = &line[..keyword_offset];
        let comment = &trimmed[..comment.len()];

        if let Some(rest) = body.strip_prefix(START_KEYWORD) {
            let rest_offset = keyword_offset + START_KEYWORD.len();
            parse_start(prefix, comment, rest, rest_offset)
        } else if let Some(rest) = body.strip_prefix(END_KEYWORD) {
            parse_end(comment, rest)
        } else {
            TagLine::Content
        }
    }
}

/// Whitespace-separated tokens with their byte offsets in `text`.
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((s, &text[s..idx]));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

fn split_id(rest: &str) -> (&str, &str) {
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    rest.split_at(end)
}

fn parse_start<'a>(prefix: &'a str, comment: &'a str, rest: &'a str, rest_offset: usize) -> TagLine<'a> {
    let (id, tail) = split_id(rest);
    if id.is_empty() {
        return TagLine::MalformedStart {
            id: None,
            reason: "missing marker id",
        };
    }
    if !is_valid_id(id) {
        return TagLine::MalformedStart {
            id: Some(id),
            reason: "invalid marker id",
        };
    }

    let tail_offset = id.len();
    let mut toks = tokens(tail);
    let mut comment_end = None;
    if toks.len() >= 2 && toks.last().is_some_and(|(_, t)| is_comment_end(t)) {
        comment_end = toks.pop().map(|(_, t)| t);
    }

    let (checksum, (target_pos, target)) = match toks.as_slice() {
        [target] => (None, *target),
        [checksum, target] => (Some(checksum.1), *target),
        [] => {
            return TagLine::MalformedStart {
                id: Some(id),
                reason: "missing target",
            };
        }
        _ => {
            return TagLine::MalformedStart {
                id: Some(id),
                reason: "unexpected tokens after target",
            };
        }
    };

    let suffix = &tail[target_pos + target.len()..];
    TagLine::Start(StartTag {
        prefix,
        comment,
        id,
        checksum,
        target,
        target_offset: rest_offset + tail_offset + target_pos,
        suffix,
        comment_end,
    })
}

fn parse_end<'a>(comment: &'a str, rest: &'a str) -> TagLine<'a> {
    let (id, tail) = split_id(rest);
    if id.is_empty() {
        return TagLine::MalformedEnd {
            id: None,
            reason: "missing marker id",
        };
    }
    if !is_valid_id(id) {
        return TagLine::MalformedEnd {
            id: Some(id),
            reason: "invalid marker id",
        };
    }
    match tokens(tail).as_slice() {
        [] => TagLine::End(EndTag {
            comment,
            id,
            comment_end: None,
        }),
        [(_, end)] if is_comment_end(end) => TagLine::End(EndTag {
            comment,
            id,
            comment_end: Some(end),
        }),
        _ => TagLine::MalformedEnd {
            id: Some(id),
            reason: "unexpected tokens after marker id",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(line: &str) -> StartTag<'_> {
        match TagSyntax::default().classify(line) {
            TagLine::Start(tag) => tag,
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn longest_comment_wins() {
        let syntax = TagSyntax::new(["-", "--", "<!--"]);
        assert_eq!(syntax.comments()[0], "<!--");
        let tag = match syntax.classify("-- sync-end:a") {
            TagLine::End(tag) => tag,
            other => panic!("{:?}", other),
        };
        assert_eq!(tag.comment, "--");
    }

    #[test]
    fn html_comment_end_is_split_off() {
        let tag = start("<!-- sync-start:demo 12 src/a.rs -->");
        assert_eq!(tag.comment, "<!--");
        assert_eq!(tag.comment_end, Some("-->"));
        assert_eq!(tag.target, "src/a.rs");
        assert_eq!(tag.suffix, " -->");
    }

    #[test]
    fn target_offset_points_at_target() {
        let line = "    # sync-start:x 5 ../b.py";
        let tag = start(line);
        assert_eq!(&line[tag.target_offset..], "../b.py");
        assert_eq!(tag.prefix, "    # ");
    }

    #[test]
    fn no_space_between_comment_and_keyword() {
        let tag = start("//sync-start:a b");
        assert_eq!(tag.prefix, "//");
        assert_eq!(tag.checksum, None);
        assert_eq!(tag.target, "b");
    }

    #[test]
    fn render_keeps_prefix_and_suffix() {
        let tag = start("  /* sync-start:a 1 old.c */  ");
        assert_eq!(tag.render("2", "new.c"), "  /* sync-start:a 2 new.c */  ");
        assert_eq!(tag.render("", "old.c"), "  /* sync-start:a old.c */  ");
    }

    #[test]
    fn unrelated_comment_is_content() {
        let syntax = TagSyntax::default();
        assert_eq!(syntax.classify("// just a note"), TagLine::Content);
        assert_eq!(syntax.classify("sync-start:a b"), TagLine::Content);
    }

    #[test]
    fn tokens_track_offsets() {
        assert_eq!(tokens("  a bb\tc "), vec![(2, "a"), (4, "bb"), (7, "c")]);
        assert!(tokens("   ").is_empty());
    }
}
