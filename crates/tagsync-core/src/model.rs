//! Cache data model
//!
//! The [`MarkerCache`] maps absolute file paths to what was parsed from
//! them. A file reachable under several names (symlinks) has one entry per
//! name; only the canonical entry can be writable, and every entry of the
//! group carries the same alias list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tagsync_tags::{ErrorDetails, Target};

/// One synchronized block within a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub content_checksum: String,
    pub self_checksum: String,
    pub comment_start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_end: Option<String>,
    /// Declarations keyed by 1-based line.
    pub targets: BTreeMap<usize, Target>,
}

/// Everything known about one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Only pulled in as a reference; never fixed.
    pub read_only: bool,
    /// Every path naming this file, canonical path included.
    pub aliases: Vec<String>,
    /// Logical root used for root-relative paths.
    pub root: String,
    pub markers: BTreeMap<String, Marker>,
    pub errors: Vec<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
}

impl FileInfo {
    pub fn new(path: &str, root: &str, read_only: bool) -> Self {
        Self {
            read_only,
            aliases: vec![path.to_string()],
            root: root.to_string(),
            markers: BTreeMap::new(),
            errors: Vec::new(),
            line_count: None,
        }
    }

    /// Whether `path` names this file.
    pub fn is_alias(&self, path: &str) -> bool {
        self.aliases.iter().any(|a| a == path)
    }
}

/// Parsed files keyed by absolute normalized path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerCache {
    entries: BTreeMap<String, FileInfo>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&FileInfo> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, info: FileInfo) {
        self.entries.insert(path.into(), info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries eligible for fixing, in path order.
    pub fn fixable(&self) -> impl Iterator<Item = (&str, &FileInfo)> {
        self.iter().filter(|(_, info)| !info.read_only)
    }

    /// Register `alias` as another name for the entry at `canonical`.
    ///
    /// The alias key receives a read-only copy of the entry, and the alias
    /// list of every key in the group is updated. Does nothing when
    /// `canonical` is not cached.
    pub fn add_alias(&mut self, canonical: &str, alias: &str) {
        if canonical == alias {
            return;
        }
        let Some(entry) = self.entries.get_mut(canonical) else {
            return;
        };
        if !entry.is_alias(alias) {
            entry.aliases.push(alias.to_string());
        }
        let aliases = entry.aliases.clone();
        let mut copy = entry.clone();
        copy.read_only = true;

        for key in &aliases {
            if key != canonical {
                if let Some(other) = self.entries.get_mut(key) {
                    other.aliases = aliases.clone();
                }
            }
        }
        self.entries.insert(alias.to_string(), copy);
    }
}
