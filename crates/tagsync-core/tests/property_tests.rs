//! Property tests for the fix engine and migration resolver.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tagsync_core::fix::rewrite;
use tagsync_core::{MigrationMode, MigrationOptions, MigrationResolver};
use tagsync_fs::io::LineReader;
use tagsync_tags::FixAction;

fn run(input: &str, fixes: &[FixAction]) -> (String, usize) {
    let mut reader = LineReader::new(input.as_bytes());
    let mut out = Vec::new();
    let applied = rewrite(&mut reader, &mut out, fixes).unwrap();
    (String::from_utf8(out).unwrap(), applied)
}

proptest! {
    #[test]
    fn rewrite_without_fixes_is_identity(input in "[a-z /#\r\n]{0,200}") {
        let (out, applied) = run(&input, &[]);
        prop_assert_eq!(out, input);
        prop_assert_eq!(applied, 0);
    }

    #[test]
    fn replace_touches_only_its_line(
        lines in prop::collection::vec("[a-c]{1,3}", 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(lines.len());
        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let fix = FixAction::Replace {
            line: index + 1,
            text: "REPLACED".into(),
            description: String::new(),
            declaration: lines[index].clone(),
        };

        let (out, applied) = run(&input, &[fix]);
        prop_assert_eq!(applied, 1);
        let mut expected = lines.clone();
        expected[index] = "REPLACED".into();
        let expected: String = expected.iter().map(|l| format!("{}\n", l)).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn migration_uses_longest_matching_prefix(
        mappings in prop::collection::btree_map("[ab/]{1,4}", "[xy/]{0,3}", 0..6),
        relative in "[ab/]{0,8}",
    ) {
        let options = MigrationOptions {
            mode: MigrationMode::Missing,
            mappings: mappings.clone(),
        };
        let resolved = MigrationResolver::new(&options).resolve(&relative);

        let best: Option<(&String, &String)> = mappings
            .iter()
            .filter(|(from, _)| relative.starts_with(from.as_str()))
            .max_by_key(|(from, _)| from.len());
        match (best, resolved) {
            (Some((from, to)), Some(migrated)) => {
                prop_assert!(migrated.starts_with(to.as_str()));
                prop_assert_eq!(&migrated[to.len()..], &relative[from.len()..]);
                prop_assert_ne!(migrated, relative.clone());
            }
            (Some((from, to)), None) => {
                prop_assert_eq!(format!("{}{}", to, &relative[from.len()..]), relative.clone());
            }
            (None, resolved) => prop_assert_eq!(resolved, None),
        }
    }
}

#[test]
fn empty_mappings_never_migrate() {
    let options = MigrationOptions {
        mode: MigrationMode::All,
        mappings: BTreeMap::new(),
    };
    assert_eq!(MigrationResolver::new(&options).resolve("a/b"), None);
}
