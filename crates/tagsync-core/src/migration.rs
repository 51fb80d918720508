//! Longest-prefix target migration

use std::collections::BTreeMap;

use tagsync_fs::NormalizedPath;

use crate::options::MigrationOptions;

/// Maps root-relative paths through the configured prefixes.
#[derive(Debug, Clone, Copy)]
pub struct MigrationResolver<'a> {
    mappings: &'a BTreeMap<String, String>,
}

impl<'a> MigrationResolver<'a> {
    pub fn new(options: &'a MigrationOptions) -> Self {
        Self {
            mappings: &options.mappings,
        }
    }

    /// Rewrite `relative` through the most specific matching prefix.
    ///
    /// Prefixes match as literal strings. Returns `None` when nothing
    /// matches or the rewrite would not change the path.
    pub fn resolve(&self, relative: &str) -> Option<String> {
        let (from, to) = self
            .mappings
            .iter()
            .filter(|(from, _)| relative.starts_with(from.as_str()))
            .max_by_key(|(from, _)| from.len())?;
        let migrated = format!("{}{}", to, &relative[from.len()..]);
        (migrated != relative).then_some(migrated)
    }

    /// Migrate an absolute target path declared under `root`, returning
    /// the replacement exactly as it is written back into the declaration.
    pub fn resolve_target(&self, root: &NormalizedPath, target: &str) -> Option<String> {
        if self.mappings.is_empty() {
            return None;
        }
        let relative = NormalizedPath::new(target).relative_to(root)?;
        self.resolve(&relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MigrationMode;

    fn options(pairs: &[(&str, &str)]) -> MigrationOptions {
        MigrationOptions {
            mode: MigrationMode::Missing,
            mappings: pairs
                .iter()
                .map(|(f, t)| (f.to_string(), t.to_string()))
                .collect(),
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let opts = options(&[("a/", "X/"), ("a/b/", "Y/"), ("a/b/c/", "Z/")]);
        let resolver = MigrationResolver::new(&opts);
        assert_eq!(resolver.resolve("a/b/c/file.ts").as_deref(), Some("Z/file.ts"));
        assert_eq!(resolver.resolve("a/b/file.ts").as_deref(), Some("Y/file.ts"));
        assert_eq!(resolver.resolve("a/file.ts").as_deref(), Some("X/file.ts"));
        assert_eq!(resolver.resolve("b/file.ts"), None);
    }

    #[test]
    fn prefixes_are_literal_strings() {
        let opts = options(&[("src", "lib")]);
        let resolver = MigrationResolver::new(&opts);
        assert_eq!(resolver.resolve("srcs/a.rs").as_deref(), Some("libs/a.rs"));
    }

    #[test]
    fn identity_mapping_is_not_a_migration() {
        let opts = options(&[("a/", "a/")]);
        assert_eq!(MigrationResolver::new(&opts).resolve("a/x"), None);
    }

    #[test]
    fn target_outside_root_does_not_migrate() {
        let opts = options(&[("a/", "b/")]);
        let resolver = MigrationResolver::new(&opts);
        let root = NormalizedPath::new("/repo");
        assert_eq!(resolver.resolve_target(&root, "/elsewhere/a/x.md"), None);
        assert_eq!(
            resolver.resolve_target(&root, "/repo/a/x.md").as_deref(),
            Some("b/x.md")
        );
    }

    #[test]
    fn url_replacement_is_kept_verbatim() {
        let opts = options(&[("vendor/", "https://example.com/lib/")]);
        let resolver = MigrationResolver::new(&opts);
        let root = NormalizedPath::new("/repo");
        assert_eq!(
            resolver.resolve_target(&root, "/repo/vendor/x.js").as_deref(),
            Some("https://example.com/lib/x.js")
        );
    }
}
