//! Streaming fix application
//!
//! A file is copied line by line into its replacement. Fixes are indexed by
//! the exact declaration text and matched against both text and line
//! number, so two identical declarations in one file are told apart.

use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, Write};

use tagsync_fs::io::{AtomicWriter, LineReader, open_lines};
use tagsync_fs::NormalizedPath;
use tagsync_tags::FixAction;

use crate::{Error, Result};

/// Stream `reader` into `writer`, applying `fixes`.
///
/// Lines without a fix are copied byte for byte, terminator included. A
/// delete wins over a replace on the same line. Returns the number of
/// fixes that matched a line.
pub fn rewrite<R: BufRead, W: Write>(
    reader: &mut LineReader<R>,
    writer: &mut W,
    fixes: &[FixAction],
) -> std::io::Result<usize> {
    let mut index: HashMap<&str, VecDeque<&FixAction>> = HashMap::new();
    let mut sorted: Vec<&FixAction> = fixes.iter().collect();
    sorted.sort_by_key(|fix| fix.line());
    for fix in sorted {
        index.entry(fix.declaration()).or_default().push_back(fix);
    }

    let mut applied = 0;
    let mut number = 0;
    while let Some(line) = reader.next_line()? {
        number += 1;
        let mut matched: Vec<&FixAction> = Vec::new();
        if let Some(queue) = index.get_mut(line.text.as_str()) {
            while queue.front().is_some_and(|fix| fix.line() < number) {
                queue.pop_front();
            }
            while let Some(fix) = queue.front().copied().filter(|fix| fix.line() == number) {
                matched.push(fix);
                queue.pop_front();
            }
        }
        applied += matched.len();

        if matched.iter().any(|fix| matches!(fix, FixAction::Delete { .. })) {
            continue;
        }
        match matched.first() {
            Some(FixAction::Replace { text, .. }) => {
                writer.write_all(text.as_bytes())?;
                writer.write_all(line.terminator.as_bytes())?;
            }
            _ => writer.write_all(line.raw().as_bytes())?,
        }
    }
    writer.flush()?;
    Ok(applied)
}

/// Apply `fixes` to the file at `path`.
///
/// The file is replaced atomically. In dry-run mode the same pass runs
/// against a discarding writer so stale fixes are still detected. Fails
/// without touching the file if any fix no longer matches its line.
pub fn apply_fixes(path: &NormalizedPath, fixes: &[FixAction], dry_run: bool) -> Result<usize> {
    let mut reader = open_lines(path)?;
    let io_error = |e| Error::from(tagsync_fs::Error::io(path.to_native(), e));

    let applied = if dry_run {
        rewrite(&mut reader, &mut std::io::sink(), fixes).map_err(io_error)?
    } else {
        let mut writer = AtomicWriter::create(path)?;
        let applied = rewrite(&mut reader, &mut writer, fixes).map_err(io_error)?;
        // An uncommitted writer discards its temp file on drop
        if applied == fixes.len() {
            writer.commit()?;
        }
        applied
    };

    if applied != fixes.len() {
        return Err(Error::StaleFixes {
            path: path.to_native(),
            expected: fixes.len(),
            applied,
        });
    }
    tracing::debug!(path = %path, applied, dry_run, "Applied fixes");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(line: usize, from: &str, to: &str) -> FixAction {
        FixAction::Replace {
            line,
            text: to.into(),
            description: String::new(),
            declaration: from.into(),
        }
    }

    fn delete(line: usize, text: &str) -> FixAction {
        FixAction::Delete {
            line,
            description: String::new(),
            declaration: text.into(),
        }
    }

    fn run(input: &str, fixes: &[FixAction]) -> (String, usize) {
        let mut reader = LineReader::new(input.as_bytes());
        let mut out = Vec::new();
        let applied = rewrite(&mut reader, &mut out, fixes).unwrap();
        (String::from_utf8(out).unwrap(), applied)
    }

    #[test]
    fn identical_lines_are_disambiguated_by_number() {
        let input = "dup\nx\ndup\n";
        let (out, applied) = run(input, &[replace(3, "dup", "new")]);
        assert_eq!(out, "dup\nx\nnew\n");
        assert_eq!(applied, 1);
    }

    #[test]
    fn replace_keeps_crlf_terminator() {
        let (out, _) = run("a\r\nb\r\n", &[replace(1, "a", "A")]);
        assert_eq!(out, "A\r\nb\r\n");
    }

    #[test]
    fn delete_wins_over_replace() {
        let (out, applied) = run("a\nb\n", &[replace(2, "b", "B"), delete(2, "b")]);
        assert_eq!(out, "a\n");
        assert_eq!(applied, 2);
    }

    #[test]
    fn unmatched_fix_is_not_counted() {
        let (out, applied) = run("a\nb", &[replace(1, "b", "B")]);
        assert_eq!(out, "a\nb");
        assert_eq!(applied, 0);
    }
}
