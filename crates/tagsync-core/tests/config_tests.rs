//! Loading configuration files into run options.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tagsync_core::{CacheMode, Config, Error, MigrationMode, Options};
use tagsync_test_utils::TestTree;

const TOML: &str = r##"
comments = ["//", "#"]
auto_fix = true
exclude = ["vendor/**"]

[migration]
mode = "all"

[[migration.mappings]]
from = "old/"
to = "new/"

[cache]
path = "cache.json"
mode = "write"
"##;

const JSON: &str = r##"{
  "comments": ["//", "#"],
  "auto_fix": true,
  "exclude": ["vendor/**"],
  "migration": {"mode": "all", "mappings": [{"from": "old/", "to": "new/"}]},
  "cache": {"path": "cache.json", "mode": "write"}
}"##;

const YAML: &str = r##"
comments: ["//", "#"]
auto_fix: true
exclude: ["vendor/**"]
migration:
  mode: all
  mappings:
    - from: old/
      to: new/
cache:
  path: cache.json
  mode: write
"##;

#[rstest]
#[case::toml("tagsync.toml", TOML)]
#[case::json("tagsync.json", JSON)]
#[case::yaml("tagsync.yaml", YAML)]
fn config_formats_load_identically(#[case] name: &str, #[case] content: &str) {
    let tree = TestTree::new();
    tree.write(name, content);

    let found = Config::discover(&tree.path("deep/nested/dir")).expect("config found");
    assert_eq!(found, tree.path(name));

    let options = Options::from_config(Config::load(&found).unwrap()).unwrap();
    assert_eq!(options.comments, vec!["//".to_string(), "#".to_string()]);
    assert!(options.auto_fix);
    assert!(!options.dry_run);
    assert_eq!(options.exclude, vec!["vendor/**".to_string()]);
    assert_eq!(options.migration.mode, MigrationMode::All);
    assert_eq!(options.migration.mappings["old/"], "new/");
    assert_eq!(options.cache.unwrap().mode, CacheMode::Write);
}

#[test]
fn unknown_keys_are_rejected() {
    let tree = TestTree::new();
    let path = tree.write("tagsync.toml", "autofix = true\n");
    assert!(Config::load(&path).is_err());
}

#[test]
fn empty_comment_list_is_invalid() {
    let config = Config {
        comments: Some(Vec::new()),
        ..Config::default()
    };
    assert!(matches!(
        Options::from_config(config),
        Err(Error::InvalidOption { .. })
    ));
}

#[test]
fn command_line_layer_overrides_file() {
    let tree = TestTree::new();
    let path = tree.write("tagsync.toml", TOML);
    let file = Config::load(&path).unwrap();
    let flags = Config {
        auto_fix: Some(false),
        ..Config::default()
    };
    let options = Options::from_config(file.merge(flags)).unwrap();
    assert!(!options.auto_fix);
    assert_eq!(options.comments.len(), 2);
}
