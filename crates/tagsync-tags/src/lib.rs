//! Sync tag parsing and writing for tagsync.
//!
//! Duplicated text blocks are wrapped in paired comment tags:
//!
//! ```text
//! // sync-start:example 1234567890 docs/guide.md
//! fn example() {}
//! // sync-end:example
//! ```
//!
//! - [`syntax`] tokenizes one line into a start tag, end tag or content.
//! - [`parser`] is the per-file state machine that accumulates marker
//!   content and reports structural problems.
//! - [`writer`] rewrites declaration lines with a new checksum or target.
//! - [`diagnostic`] holds the error taxonomy shared with the consistency
//!   engine.

pub mod diagnostic;
pub mod parser;
pub mod syntax;
pub mod target;
pub mod writer;

pub use diagnostic::{ErrorCode, ErrorDetails, FixAction, Location};
pub use parser::{CompletedMarker, ParseHandler, TagParser};
pub use syntax::{CommentSyntax, DEFAULT_COMMENTS, EndTag, StartTag, TagLine, TagSyntax};
pub use target::{ResolvedTarget, Target, TargetKind, TargetResolver, is_remote};
pub use writer::{rewrite_checksum, rewrite_target};
