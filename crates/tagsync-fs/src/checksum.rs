//! Marker checksums
//!
//! A checksum is the decimal rendering of the first eight bytes of a
//! SHA-256 digest. Tags carry them as plain digit runs, which keeps
//! declaration lines short and easy to diff.

use sha2::{Digest, Sha256};

/// Sentinel recorded when a marker has no content to hash.
pub const NO_CHECKSUM: &str = "No checksum";

fn digest<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let bytes = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(head).to_string()
}

/// Checksum of a marker's content lines (terminators included).
///
/// Returns [`NO_CHECKSUM`] for empty content.
pub fn content_checksum<S: AsRef<str>>(lines: &[S]) -> String {
    if lines.is_empty() {
        return NO_CHECKSUM.to_string();
    }
    digest(lines.iter().map(|l| l.as_ref().as_bytes()))
}

/// Checksum of a marker's content lines plus the declaring file's
/// root-relative path.
///
/// Always computable: the path participates even when there is no content.
pub fn self_checksum<S: AsRef<str>>(lines: &[S], relative_path: &str) -> String {
    digest(
        lines
            .iter()
            .map(|l| l.as_ref().as_bytes())
            .chain([b"\0".as_slice(), relative_path.as_bytes()]),
    )
}
