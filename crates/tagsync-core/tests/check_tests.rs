//! Integration tests for cross-file consistency checking.

mod common;

use std::collections::BTreeMap;

use common::{check, codes, errors_for};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tagsync_core::fix::apply_fixes;
use tagsync_core::{
    ErrorGenerator, FileInfo, Marker, MarkerCache, MigrationMode, MigrationOptions, Options,
};
use tagsync_fs::checksum::self_checksum;
use tagsync_tags::{ErrorCode, FixAction, Target, TargetKind};
use tagsync_test_utils::{TestTree, block, checksum_of};

fn local(reference: &str, path: &str, checksum: &str, declaration: &str) -> Target {
    Target {
        reference: reference.into(),
        kind: TargetKind::Local { path: path.into() },
        checksum: Some(checksum.into()),
        declaration: declaration.into(),
    }
}

fn marker(content_checksum: &str, targets: Vec<(usize, Target)>) -> Marker {
    Marker {
        content_checksum: content_checksum.into(),
        self_checksum: "0".into(),
        comment_start: "//".into(),
        comment_end: None,
        targets: targets.into_iter().collect(),
    }
}

fn file(path: &str, read_only: bool, markers: Vec<(&str, Marker)>) -> FileInfo {
    let mut info = FileInfo::new(path, "/r", read_only);
    info.markers = markers
        .into_iter()
        .map(|(id, m)| (id.to_string(), m))
        .collect::<BTreeMap<_, _>>();
    info
}

fn with_migration(mode: MigrationMode, pairs: &[(&str, &str)]) -> Options {
    Options {
        migration: MigrationOptions {
            mode,
            mappings: pairs
                .iter()
                .map(|(f, t)| (f.to_string(), t.to_string()))
                .collect(),
        },
        ..Options::default()
    }
}

#[test]
fn mismatched_checksum_gets_replace_fix() {
    let mut cache = MarkerCache::new();
    cache.insert(
        "/r/filea",
        file(
            "/r/filea",
            true,
            vec![(
                "marker",
                marker(
                    "1234",
                    vec![(1, local("fileb", "/r/fileb", "5678", "// sync-start:marker 5678 fileb"))],
                ),
            )],
        ),
    );
    cache.insert(
        "/r/fileb",
        file(
            "/r/fileb",
            false,
            vec![(
                "marker",
                marker(
                    "5678",
                    vec![(1, local("filea", "/r/filea", "WRONG", "// sync-start:marker WRONG filea"))],
                ),
            )],
        ),
    );

    let options = Options::default();
    let reports = ErrorGenerator::new(&options).generate(&cache);
    assert_eq!(reports.len(), 1);
    let errors = &reports[0].errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::MismatchedChecksum);
    assert_eq!(errors[0].line(), Some(1));
    match errors[0].fix.as_ref().expect("fix") {
        FixAction::Replace { text, line, .. } => {
            assert_eq!(*line, 1);
            assert!(text.contains("sync-start:marker 1234 filea"), "{}", text);
        }
        other => panic!("unexpected fix {:?}", other),
    }
}

#[test]
fn missing_return_tag_is_unfixable() {
    let mut cache = MarkerCache::new();
    cache.insert(
        "/r/filea",
        file(
            "/r/filea",
            false,
            vec![(
                "marker",
                marker(
                    "1",
                    vec![(3, local("fileb", "/r/fileb", "2", "// sync-start:marker 2 fileb"))],
                ),
            )],
        ),
    );
    cache.insert("/r/fileb", file("/r/fileb", true, vec![]));

    let options = Options::default();
    let reports = ErrorGenerator::new(&options).generate(&cache);
    let errors = &reports[0].errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::NoReturnTag);
    assert_eq!(errors[0].reason, "No return tag named 'marker' in 'fileb'");
    assert_eq!(errors[0].line(), Some(3));
    assert!(!errors[0].is_fixable());
}

#[test]
fn return_tag_must_point_back() {
    let mut cache = MarkerCache::new();
    cache.insert(
        "/r/filea",
        file(
            "/r/filea",
            false,
            vec![(
                "m",
                marker("1", vec![(1, local("fileb", "/r/fileb", "2", "// sync-start:m 2 fileb"))]),
            )],
        ),
    );
    cache.insert(
        "/r/fileb",
        file(
            "/r/fileb",
            true,
            vec![(
                "m",
                marker("2", vec![(1, local("filec", "/r/filec", "1", "// sync-start:m 1 filec"))]),
            )],
        ),
    );

    let options = Options::default();
    let reports = ErrorGenerator::new(&options).generate(&cache);
    assert_eq!(codes(&reports[0]), vec![ErrorCode::NoReturnTag]);
}

#[test]
fn consistent_pair_has_no_errors() {
    let tree = TestTree::new();
    let a = tree.write(
        "a.md",
        &block("m", Some(&checksum_of(&["beta"])), "b.md", &["alpha"]),
    );
    let b = tree.write(
        "b.md",
        &block("m", Some(&checksum_of(&["alpha"])), "a.md", &["beta"]),
    );

    let reports = check(&Options::default(), &[a, b]);
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(report.errors.is_empty(), "{}: {:?}", report.path, report.errors);
    }
}

#[test]
fn unchecksummed_declarations_to_empty_markers_match() {
    let tree = TestTree::new();
    let a = tree.write("a.md", &block("m", None, "b.md", &[]));
    let b = tree.write("b.md", &block("m", None, "a.md", &[]));
    let options = Options {
        allow_empty_tags: true,
        ..Options::default()
    };
    let reports = check(&options, &[a, b]);
    assert!(reports.iter().all(|r| r.errors.is_empty()));
}

#[test]
fn applying_mismatch_fix_converges() {
    let tree = TestTree::new();
    let a = tree.write(
        "a.md",
        &block("m", Some(&checksum_of(&["beta"])), "notes/b.md", &["alpha"]),
    );
    let b = tree.write(
        "notes/b.md",
        &format!("# Notes\n\n{}", block("m", Some("WRONG"), "a.md", &["beta"])),
    );

    let options = Options::default();
    let reports = check(&options, &[a.clone(), b.clone()]);
    let report = errors_for(&reports, &b);
    assert_eq!(codes(report), vec![ErrorCode::MismatchedChecksum]);
    assert_eq!(report.errors[0].line(), Some(3));
    assert!(errors_for(&reports, &a).errors.is_empty());

    let fixes: Vec<FixAction> = report.errors.iter().filter_map(|e| e.fix.clone()).collect();
    assert_eq!(apply_fixes(&b, &fixes, false).unwrap(), 1);
    tree.assert_file_contains(
        "notes/b.md",
        &format!("// sync-start:m {} a.md", checksum_of(&["alpha"])),
    );

    let reports = check(&options, &[a, b]);
    assert!(reports.iter().all(|r| r.errors.is_empty()));
}

#[test]
fn remote_target_checks_self_checksum() {
    let tree = TestTree::new();
    let url = "https://example.com/snippet";
    let expected = self_checksum(&["x\n"], "a.md");
    let good = tree.write("a.md", &block("m", Some(&expected), url, &["x"]));
    let reports = check(&Options::default(), &[good.clone()]);
    assert!(errors_for(&reports, &good).errors.is_empty());

    tree.write("a.md", &block("m", Some("stale"), url, &["x"]));
    let reports = check(&Options::default(), &[good.clone()]);
    let report = errors_for(&reports, &good);
    assert_eq!(codes(report), vec![ErrorCode::MismatchedChecksum]);
    assert!(report.errors[0].is_fixable());
}

#[test]
fn missing_target_without_migration_is_reported() {
    let tree = TestTree::new();
    let a = tree.write("a.md", &block("m", None, "gone.md", &["x"]));
    let reports = check(&Options::default(), &[a.clone()]);
    let report = errors_for(&reports, &a);
    assert_eq!(
        codes(report),
        vec![ErrorCode::FileDoesNotExist, ErrorCode::NoReturnTag]
    );
}

#[test]
fn missing_target_is_migrated() {
    let tree = TestTree::new();
    let a = tree.write("a.md", &block("m", None, "old/b.md", &["alpha"]));
    tree.write("new/b.md", &block("m", None, "a.md", &["beta"]));

    let options = with_migration(MigrationMode::Missing, &[("old/", "new/")]);
    let reports = check(&options, &[a.clone()]);
    let report = errors_for(&reports, &a);
    assert_eq!(codes(report), vec![ErrorCode::PendingMigration]);

    let expected = format!(
        "// sync-start:m {} new/b.md",
        self_checksum(&["alpha\n"], "a.md")
    );
    match report.errors[0].fix.as_ref().expect("fix") {
        FixAction::Replace { text, .. } => assert_eq!(text, &expected),
        other => panic!("unexpected fix {:?}", other),
    }

    let fixes: Vec<FixAction> = report.errors.iter().filter_map(|e| e.fix.clone()).collect();
    apply_fixes(&a, &fixes, false).unwrap();
    tree.assert_file_contains("a.md", &expected);
}

#[rstest]
#[case::missing(MigrationMode::Missing, vec![])]
#[case::all(MigrationMode::All, vec![ErrorCode::PendingMigration])]
fn consistent_target_migrates_only_in_all_mode(
    #[case] mode: MigrationMode,
    #[case] expected: Vec<ErrorCode>,
) {
    let tree = TestTree::new();
    let a = tree.write(
        "a.md",
        &block("m", Some(&checksum_of(&["beta"])), "old/b.md", &["alpha"]),
    );
    tree.write(
        "old/b.md",
        &block("m", Some(&checksum_of(&["alpha"])), "a.md", &["beta"]),
    );

    let options = with_migration(mode, &[("old/", "new/")]);
    let reports = check(&options, &[a.clone()]);
    assert_eq!(codes(errors_for(&reports, &a)), expected);
}

#[test]
fn most_specific_mapping_is_used() {
    let tree = TestTree::new();
    let a = tree.write("a.md", &block("m", None, "src/lib/b.md", &["alpha"]));
    let options = with_migration(
        MigrationMode::Missing,
        &[("src/", "pkg/"), ("src/lib/", "core/")],
    );
    let reports = check(&options, &[a.clone()]);
    let report = errors_for(&reports, &a);
    assert_eq!(codes(report), vec![ErrorCode::PendingMigration]);
    assert!(report.errors[0].reason.contains("'core/b.md'"));
}
