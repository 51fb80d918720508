//! Declaration rewriting.
//!
//! Fixes never touch marker content; they replace a single `sync-start`
//! line. These helpers re-tokenize the original declaration and render it
//! with a new checksum and/or target, keeping indentation, the comment start
//! and anything after the target byte for byte.

use crate::syntax::{TagLine, TagSyntax};

/// Replace the checksum of a start tag declaration.
///
/// A declaration without a checksum gains one and an empty `checksum`
/// removes it. Returns `None` if
/// `declaration` is not a well-formed start tag.
///
/// # Example
/// ```
/// use tagsync_tags::{TagSyntax, rewrite_checksum};
///
/// let syntax = TagSyntax::default();
/// let fixed = rewrite_checksum(&syntax, "  // sync-start:demo WRONG b.rs", "1234").unwrap();
/// assert_eq!(fixed, "  // sync-start:demo 1234 b.rs");
/// ```
pub fn rewrite_checksum(syntax: &TagSyntax, declaration: &str, checksum: &str) -> Option<String> {
    match syntax.classify(declaration) {
        TagLine::Start(tag) => Some(tag.render(checksum, tag.target)),
        _ => None,
    }
}

/// Replace both target and checksum of a start tag declaration.
///
/// # Example
/// ```
/// use tagsync_tags::{TagSyntax, rewrite_target};
///
/// let syntax = TagSyntax::default();
/// let fixed = rewrite_target(&syntax, "<!-- sync-start:a 1 old/x.md -->", "new/x.md", "9");
/// assert_eq!(fixed.as_deref(), Some("<!-- sync-start:a 9 new/x.md -->"));
/// ```
pub fn rewrite_target(
    syntax: &TagSyntax,
    declaration: &str,
    target: &str,
    checksum: &str,
) -> Option<String> {
    match syntax.classify(declaration) {
        TagLine::Start(tag) => Some(tag.render(checksum, target)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_lines_are_not_rewritten() {
        let syntax = TagSyntax::default();
        assert_eq!(rewrite_checksum(&syntax, "plain text", "1"), None);
        assert_eq!(rewrite_checksum(&syntax, "// sync-end:a", "1"), None);
    }

    #[test]
    fn missing_checksum_is_inserted() {
        let syntax = TagSyntax::default();
        assert_eq!(
            rewrite_checksum(&syntax, "# sync-start:a lib.py", "77").as_deref(),
            Some("# sync-start:a 77 lib.py")
        );
    }
}
