//! Configuration loading and validation
//!
//! A [`Config`] is the raw, partially specified form read from a config file
//! or assembled from command-line flags. Layers are merged with
//! [`Config::merge`] (later layers win) and turned into validated
//! [`Options`] with [`Options::from_config`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tagsync_fs::constants::{ConfigFile, DEFAULT_ROOT_MARKER};
use tagsync_fs::{ConfigStore, NormalizedPath};
use tagsync_tags::{DEFAULT_COMMENTS, TagSyntax};

use crate::{Error, Result};

/// Which targets are rewritten when a migration mapping applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationMode {
    /// Only targets without a return tag.
    #[default]
    Missing,
    /// Every local target under a mapped prefix.
    All,
}

/// One prefix rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationConfig {
    pub mode: MigrationMode,
    pub mappings: Vec<MigrationMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Load a persisted cache instead of scanning.
    Read,
    /// Persist the scanned cache and skip checking.
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    pub path: String,
    pub mode: CacheMode,
}

/// Raw configuration as written in `tagsync.toml` and friends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fix: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_empty_tags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration: Option<MigrationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

impl Config {
    /// Find the nearest config file, walking up from `start`.
    pub fn discover(start: &NormalizedPath) -> Option<NormalizedPath> {
        let mut dir = Some(start.clone());
        while let Some(current) = dir {
            for candidate in ConfigFile::ALL {
                let path = current.join(candidate.as_str());
                if path.is_file() {
                    return Some(path);
                }
            }
            dir = current.parent();
        }
        None
    }

    /// Load a config file. The format follows the extension.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let config = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path, "Loaded configuration");
        Ok(config)
    }

    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Config) -> Config {
        Config {
            include: other.include.or(self.include),
            exclude: other.exclude.or(self.exclude),
            ignore_files: other.ignore_files.or(self.ignore_files),
            comments: other.comments.or(self.comments),
            auto_fix: other.auto_fix.or(self.auto_fix),
            dry_run: other.dry_run.or(self.dry_run),
            json: other.json.or(self.json),
            root_marker: other.root_marker.or(self.root_marker),
            allow_empty_tags: other.allow_empty_tags.or(self.allow_empty_tags),
            migration: other.migration.or(self.migration),
            cache: other.cache.or(self.cache),
        }
    }
}

/// Validated migration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationOptions {
    pub mode: MigrationMode,
    /// Source prefix to migrated prefix.
    pub mappings: BTreeMap<String, String>,
}

impl TryFrom<MigrationConfig> for MigrationOptions {
    type Error = Error;

    fn try_from(config: MigrationConfig) -> Result<Self> {
        let mut mappings = BTreeMap::new();
        for MigrationMapping { from, to } in config.mappings {
            if from.is_empty() {
                return Err(Error::InvalidMigration {
                    from,
                    reason: "source prefix is empty".into(),
                });
            }
            if let Some(existing) = mappings.get(&from) {
                if existing != &to {
                    return Err(Error::InvalidMigration {
                        reason: format!("mapped to both '{}' and '{}'", existing, to),
                        from,
                    });
                }
                continue;
            }
            mappings.insert(from, to);
        }
        Ok(Self {
            mode: config.mode,
            mappings,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    pub path: NormalizedPath,
    pub mode: CacheMode,
}

/// Fully resolved run options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub ignore_files: Vec<String>,
    pub comments: Vec<String>,
    pub auto_fix: bool,
    pub dry_run: bool,
    pub json: bool,
    pub root_marker: String,
    pub allow_empty_tags: bool,
    pub migration: MigrationOptions,
    pub cache: Option<CacheOptions>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            ignore_files: Vec::new(),
            comments: DEFAULT_COMMENTS.iter().map(|c| c.to_string()).collect(),
            auto_fix: false,
            dry_run: false,
            json: false,
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
            allow_empty_tags: false,
            migration: MigrationOptions::default(),
            cache: None,
        }
    }
}

impl Options {
    /// Validate a merged config, filling in defaults.
    pub fn from_config(config: Config) -> Result<Self> {
        let defaults = Self::default();

        let comments = config.comments.unwrap_or(defaults.comments);
        if comments.is_empty() {
            return Err(Error::InvalidOption {
                key: "comments".into(),
                reason: "at least one comment start is required".into(),
            });
        }
        if let Some(bad) = comments
            .iter()
            .find(|c| c.is_empty() || c.chars().any(char::is_whitespace))
        {
            return Err(Error::InvalidOption {
                key: "comments".into(),
                reason: format!("'{}' must be non-empty and contain no whitespace", bad),
            });
        }

        let root_marker = config.root_marker.unwrap_or(defaults.root_marker);
        if root_marker.is_empty() || root_marker.contains('/') {
            return Err(Error::InvalidOption {
                key: "root_marker".into(),
                reason: format!("'{}' must be a single file or directory name", root_marker),
            });
        }

        let migration = match config.migration {
            Some(migration) => MigrationOptions::try_from(migration)?,
            None => defaults.migration,
        };

        let cache = config.cache.map(|cache| CacheOptions {
            path: NormalizedPath::new(&cache.path),
            mode: cache.mode,
        });

        Ok(Self {
            include: config.include.unwrap_or(defaults.include),
            exclude: config.exclude.unwrap_or(defaults.exclude),
            ignore_files: config.ignore_files.unwrap_or(defaults.ignore_files),
            comments,
            auto_fix: config.auto_fix.unwrap_or(defaults.auto_fix),
            dry_run: config.dry_run.unwrap_or(defaults.dry_run),
            json: config.json.unwrap_or(defaults.json),
            root_marker,
            allow_empty_tags: config.allow_empty_tags.unwrap_or(defaults.allow_empty_tags),
            migration,
            cache,
        })
    }

    /// Tokenizer for the configured comment starts.
    pub fn syntax(&self) -> TagSyntax {
        TagSyntax::new(self.comments.iter().cloned())
    }
}
