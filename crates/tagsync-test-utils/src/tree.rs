//! [`TestTree`] builder for tagsync test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tagsync_fs::NormalizedPath;
use tagsync_fs::checksum::content_checksum;
use tempfile::TempDir;

use crate::root::fake_git_dir;

/// Render a complete `//` tagged block.
///
/// `checksum` of `None` omits the checksum. Content lines get a trailing
/// newline each.
///
/// ```
/// use tagsync_test_utils::block;
///
/// let text = block("m", Some("1"), "b.rs", &["x"]);
/// assert_eq!(text, "// sync-start:m 1 b.rs\nx\n// sync-end:m\n");
/// ```
pub fn block(id: &str, checksum: Option<&str>, target: &str, content: &[&str]) -> String {
    let mut out = match checksum {
        Some(checksum) => format!("// sync-start:{} {} {}\n", id, checksum, target),
        None => format!("// sync-start:{} {}\n", id, target),
    };
    for line in content {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("// sync-end:{}\n", id));
    out
}

/// Checksum that [`block`] content hashes to.
pub fn checksum_of(content: &[&str]) -> String {
    let lines: Vec<String> = content.iter().map(|l| format!("{}\n", l)).collect();
    content_checksum(lines.as_slice())
}

/// A temporary directory marked as a logical root.
///
/// The root path is canonicalized up front so paths built from it match
/// the canonical cache keys.
///
/// # Example
///
/// ```rust,no_run
/// use tagsync_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("a.md", "// sync-start:m b.md\nx\n// sync-end:m\n");
/// tree.assert_file_contains("a.md", "sync-start:m");
/// ```
pub struct TestTree {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create a temporary directory containing a `.git` root marker.
    pub fn new() -> Self {
        let tree = Self::bare();
        fake_git_dir(&tree.root);
        tree
    }

    /// Create a temporary directory with no root marker.
    pub fn bare() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical(temp_dir.path());
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Get the root path of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalized absolute path of `rel`.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        NormalizedPath::new(self.root.join(rel))
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> NormalizedPath {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        NormalizedPath::new(path)
    }

    /// Read a file as a string.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).unwrap()
    }

    /// Create a symlink at `link` pointing to `target` (both relative).
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, link: &str) -> NormalizedPath {
        let link_path = self.root.join(link);
        std::os::unix::fs::symlink(self.root.join(target), &link_path).unwrap();
        NormalizedPath::new(link_path)
    }

    /// Create a subdirectory marked as its own logical root.
    pub fn mark_root(&self, rel: &str) {
        let dir = self.root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fake_git_dir(&dir);
    }

    /// Assert that a file exists.
    pub fn assert_file_exists(&self, rel: &str) {
        let path = self.root.join(rel);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert that a file contains a pattern.
    pub fn assert_file_contains(&self, rel: &str, pattern: &str) {
        let content = self.read(rel);
        assert!(
            content.contains(pattern),
            "File {} does not contain '{}'. Content:\n{}",
            rel,
            pattern,
            content
        );
    }

    /// Assert that a file does not contain a pattern.
    pub fn assert_file_not_contains(&self, rel: &str, pattern: &str) {
        let content = self.read(rel);
        assert!(
            !content.contains(pattern),
            "File {} unexpectedly contains '{}'. Content:\n{}",
            rel,
            pattern,
            content
        );
    }
}

fn canonical(path: &Path) -> PathBuf {
    NormalizedPath::new(path)
        .canonicalize()
        .map(|p| p.to_native())
        .unwrap_or_else(|_| path.to_path_buf())
}
