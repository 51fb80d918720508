//! Logical root fixtures.

use std::fs;
use std::path::Path;

/// Creates an empty `.git` directory so `path` is detected as a logical
/// root. No git repository is initialised.
///
/// # Panics
/// Panics if the directory cannot be created.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
}
