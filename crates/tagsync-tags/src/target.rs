//! Declared cross-references of a marker.

use serde::{Deserialize, Serialize};

/// Where a target points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TargetKind {
    /// Absolute normalized path of a file on this machine.
    Local { path: String },
    /// A URL; its content is never fetched.
    Remote { url: String },
}

impl TargetKind {
    pub fn local_path(&self) -> Option<&str> {
        match self {
            Self::Local { path } => Some(path),
            Self::Remote { .. } => None,
        }
    }
}

/// One sync-start declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// The target exactly as written in the tag.
    pub reference: String,
    pub kind: TargetKind,
    /// Recorded checksum, if the tag carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// The full original declaration line, without terminator.
    pub declaration: String,
}

/// Result of resolving a raw target reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub kind: TargetKind,
    /// Always `true` for remote targets.
    pub exists: bool,
}

/// Resolves target references written in tags.
pub trait TargetResolver {
    fn resolve(&self, reference: &str) -> ResolvedTarget;
}

impl<F> TargetResolver for F
where
    F: Fn(&str) -> ResolvedTarget,
{
    fn resolve(&self, reference: &str) -> ResolvedTarget {
        self(reference)
    }
}

/// Whether a reference names a remote resource.
pub fn is_remote(reference: &str) -> bool {
    reference.contains("://")
}
