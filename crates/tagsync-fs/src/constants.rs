//! Well-known file names used by tagsync.

use std::path::Path;

/// Directory or file whose presence marks a logical root by default.
pub const DEFAULT_ROOT_MARKER: &str = ".git";

/// Extra gitignore-style file honored during file enumeration.
pub const IGNORE_FILE: &str = ".tagsyncignore";

/// Configuration file names, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFile {
    Toml,
    HiddenToml,
    Json,
    Yaml,
}

impl ConfigFile {
    /// All candidates in the order they are probed.
    pub const ALL: [ConfigFile; 4] = [
        ConfigFile::Toml,
        ConfigFile::HiddenToml,
        ConfigFile::Json,
        ConfigFile::Yaml,
    ];

    /// Get the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "tagsync.toml",
            Self::HiddenToml => ".tagsync.toml",
            Self::Json => "tagsync.json",
            Self::Yaml => "tagsync.yaml",
        }
    }
}

impl AsRef<Path> for ConfigFile {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
