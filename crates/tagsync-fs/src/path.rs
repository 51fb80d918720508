//! Lexically cleaned, slash-separated paths
//!
//! Marker targets and cache keys compare as strings, so every path in
//! tagsync goes through [`NormalizedPath`] first.

use std::path::{Path, PathBuf};

/// A forward-slash path in canonical lexical form.
///
/// Construction is purely lexical: backslashes become forward slashes,
/// empty and `.` components are dropped and `..` pops the previous
/// component. A leading `//` is kept for network paths. No filesystem
/// access happens until one of the I/O helpers is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self { inner: clean(&raw) }
    }

    /// The cleaned form, as used for cache keys.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Path for handing to `std::fs`.
    pub fn to_native(&self) -> PathBuf {
        self.inner.clone().into()
    }

    /// Append `segment`, resolving `..` lexically. An empty or `.` segment
    /// leaves the path unchanged.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if matches!(clean(&segment).as_str(), "" | ".") {
            return self.clone();
        }
        let inner = match self.inner.as_str() {
            "" => clean(&segment),
            base if base.ends_with('/') => clean(&(base.to_owned() + &segment)),
            base => clean(&[base, segment.as_str()].join("/")),
        };
        Self { inner }
    }

    /// Containing directory. `None` for a bare name or the filesystem root.
    pub fn parent(&self) -> Option<Self> {
        let (head, _) = self.inner.rsplit_once('/')?;
        let inner = match head {
            "" if self.inner.len() > 1 => "/",
            "" => return None,
            head => head,
        };
        Some(Self {
            inner: inner.to_string(),
        })
    }

    /// Last component, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != ".")
    }

    /// Extension of the last component. Dotfiles such as `.tagsyncignore`
    /// have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Express this path relative to `base`.
    ///
    /// Returns `None` when the path does not live under `base`. A path equal
    /// to `base` yields an empty string.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<String> {
        if self.inner == base.inner {
            return Some(String::new());
        }
        let rest = self.inner.strip_prefix(base.inner.as_str())?;
        if base.inner.ends_with('/') {
            Some(rest.to_string())
        } else {
            rest.strip_prefix('/').map(str::to_string)
        }
    }

    /// Real path with symlinks resolved.
    pub fn canonicalize(&self) -> std::io::Result<Self> {
        dunce::canonicalize(self.to_native()).map(Self::new)
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

/// Lexically clean a forward-slash path.
fn clean(raw: &str) -> String {
    let network = raw.starts_with("//") && !raw.starts_with("///");
    let absolute = raw.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if network {
        format!("//{}", body)
    } else if absolute {
        format!("/{}", body)
    } else if body.is_empty() && !raw.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_requires_component_boundary() {
        let base = NormalizedPath::new("/repo/docs");
        assert_eq!(
            NormalizedPath::new("/repo/docs/guide.md").relative_to(&base),
            Some("guide.md".to_string())
        );
        assert_eq!(NormalizedPath::new("/repo/docsets/a.md").relative_to(&base), None);
        assert_eq!(base.relative_to(&base), Some(String::new()));
    }

    #[test]
    fn relative_to_root_directory() {
        let base = NormalizedPath::new("/");
        assert_eq!(
            NormalizedPath::new("/etc/hosts").relative_to(&base),
            Some("etc/hosts".to_string())
        );
    }

    #[test]
    fn join_resolves_parent_segments() {
        let root = NormalizedPath::new("/repo/src");
        assert_eq!(root.join("../docs/a.md").as_str(), "/repo/docs/a.md");
    }
}
