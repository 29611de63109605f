// logtriage - core/split.rs
//
// Category-based splitting: classify every line, group by category,
// and persist one output file per non-empty category.
//
// `flush` writes through the platform fs helper so each individual
// category file is written atomically (temp + rename). Across
// categories the operation is deliberately best-effort: a failure
// partway through leaves the files already written in place. This
// matches the historical behaviour of the split output and is part of
// the documented contract.

use crate::core::classify::RuleSet;
use crate::core::model::Category;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{Result, TriageError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// =============================================================================
// Output bundle
// =============================================================================

/// In-memory grouping of classified lines by category, built up
/// line-by-line during a run and discarded after `flush`.
///
/// Each stored line keeps its global input sequence number so legacy
/// fold mode can merge several categories back into original file
/// order.
#[derive(Debug, Default)]
pub struct OutputBundle {
    /// One slot per `Category`, indexed by declaration order.
    groups: [Vec<(usize, String)>; Category::COUNT],

    /// Lines pushed so far; doubles as the next sequence number.
    total: usize,
}

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line under its category, preserving insertion order.
    pub fn push(&mut self, category: Category, text: impl Into<String>) {
        let seq = self.total;
        self.total += 1;
        self.groups[category as usize].push((seq, text.into()));
    }

    /// Lines recorded for a category, in original input order.
    pub fn lines(&self, category: Category) -> impl Iterator<Item = &str> {
        self.groups[category as usize]
            .iter()
            .map(|(_, text)| text.as_str())
    }

    /// Number of lines recorded for a category.
    pub fn count(&self, category: Category) -> usize {
        self.groups[category as usize].len()
    }

    /// Total lines recorded across all categories.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Per-category counts, including zero-line categories.
    pub fn counts(&self) -> HashMap<Category, usize> {
        Category::all()
            .iter()
            .map(|&c| (c, self.count(c)))
            .collect()
    }

    /// Merge the given categories back into original input order.
    /// Used by legacy fold mode to produce a combined `other` stream.
    fn merged(&self, categories: &[Category]) -> Vec<&str> {
        let mut entries: Vec<&(usize, String)> = categories
            .iter()
            .flat_map(|&c| self.groups[c as usize].iter())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.iter().map(|(_, text)| text.as_str()).collect()
    }
}

/// Classify every line through the rule set and group by category.
/// Original order is preserved within each category.
pub fn split<S: AsRef<str>>(lines: &[S], rules: &RuleSet) -> OutputBundle {
    let mut bundle = OutputBundle::new();
    for line in lines {
        let line = line.as_ref();
        bundle.push(rules.classify(line), line);
    }
    bundle
}

// =============================================================================
// Flush
// =============================================================================

/// Output file naming scheme, selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingMode {
    /// `<prefix>_<category>.log` for each of the seven categories.
    Extended,

    /// Bare `error.txt` / `warning.txt` / `success.txt` / `other.txt`.
    /// When `fold_extra` is set, info/debug/platform-info lines are
    /// merged into `other.txt` in original file order; otherwise those
    /// categories are simply not written.
    Legacy { fold_extra: bool },
}

/// Categories that legacy mode writes under their own bare filename.
const LEGACY_CATEGORIES: &[Category] = &[
    Category::Error,
    Category::Warning,
    Category::Success,
    Category::Other,
];

/// Categories legacy fold mode merges into `other.txt`.
const LEGACY_FOLDED: &[Category] = &[
    Category::Info,
    Category::Debug,
    Category::PlatformInfo,
    Category::Other,
];

/// Write one file per non-empty category into `output_dir` and return
/// the paths written, in category-priority order.
///
/// Lines are written one per record, terminated with `\n`. Categories
/// with zero lines produce no file. Each file write is atomic, but the
/// call as a whole is not: on failure, files written for earlier
/// categories remain in place.
pub fn flush(
    bundle: &OutputBundle,
    output_dir: &Path,
    prefix: &str,
    mode: NamingMode,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| TriageError::io(output_dir, "create output directory", e))?;

    let mut written = Vec::new();

    match mode {
        NamingMode::Extended => {
            for &category in Category::all() {
                let lines: Vec<&str> = bundle.lines(category).collect();
                let name = format!(
                    "{prefix}_{}.{}",
                    category.label(),
                    constants::EXTENDED_OUTPUT_EXT
                );
                if let Some(path) = write_category(output_dir, &name, &lines)? {
                    written.push(path);
                }
            }
        }
        NamingMode::Legacy { fold_extra } => {
            for &category in LEGACY_CATEGORIES {
                let lines: Vec<&str> = if category == Category::Other && fold_extra {
                    bundle.merged(LEGACY_FOLDED)
                } else {
                    bundle.lines(category).collect()
                };
                let name = format!("{}.{}", category.label(), constants::LEGACY_OUTPUT_EXT);
                if let Some(path) = write_category(output_dir, &name, &lines)? {
                    written.push(path);
                }
            }
        }
    }

    Ok(written)
}

/// Write a single category file, or skip it when there are no lines.
fn write_category(dir: &Path, name: &str, lines: &[&str]) -> Result<Option<PathBuf>> {
    if lines.is_empty() {
        return Ok(None);
    }

    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }

    let path = dir.join(name);
    fs::write_atomic(&path, content.as_bytes())
        .map_err(|e| TriageError::io(&path, "write category file", e))?;

    tracing::debug!(path = %path.display(), lines = lines.len(), "Category file written");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> OutputBundle {
        let lines = [
            "FATAL: disk error",
            "INFO: boot start",
            "plain line one",
            "WARN: slow",
            "DBG counter=3",
            "plain line two",
            "OK: done",
        ];
        split(&lines, &RuleSet::builtin())
    }

    #[test]
    fn split_groups_by_category_preserving_order() {
        let bundle = sample_bundle();
        assert_eq!(
            bundle.lines(Category::Other).collect::<Vec<_>>(),
            vec!["plain line one", "plain line two"]
        );
        assert_eq!(bundle.count(Category::Error), 1);
        assert_eq!(bundle.count(Category::Warning), 1);
        assert_eq!(bundle.count(Category::PlatformInfo), 0);
        assert_eq!(bundle.total(), 7);
    }

    #[test]
    fn flush_extended_skips_empty_categories() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = sample_bundle();
        let written = flush(&bundle, dir.path(), "boot", NamingMode::Extended).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "boot_error.log",
                "boot_warning.log",
                "boot_info.log",
                "boot_debug.log",
                "boot_success.log",
                "boot_other.log",
            ]
        );
        assert!(!dir.path().join("boot_platform-info.log").exists());

        let errors = std::fs::read_to_string(dir.path().join("boot_error.log")).unwrap();
        assert_eq!(errors, "FATAL: disk error\n");
    }

    #[test]
    fn flush_legacy_folds_extra_categories_in_original_order() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = sample_bundle();
        let written = flush(
            &bundle,
            dir.path(),
            "ignored",
            NamingMode::Legacy { fold_extra: true },
        )
        .unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["error.txt", "warning.txt", "success.txt", "other.txt"]
        );

        // info/debug lines interleave with plain lines in file order.
        let other = std::fs::read_to_string(dir.path().join("other.txt")).unwrap();
        assert_eq!(
            other,
            "INFO: boot start\nplain line one\nDBG counter=3\nplain line two\n"
        );
    }

    #[test]
    fn flush_legacy_without_fold_drops_extra_categories() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = sample_bundle();
        flush(
            &bundle,
            dir.path(),
            "ignored",
            NamingMode::Legacy { fold_extra: false },
        )
        .unwrap();

        let other = std::fs::read_to_string(dir.path().join("other.txt")).unwrap();
        assert_eq!(other, "plain line one\nplain line two\n");
        assert!(!dir.path().join("info.txt").exists());
    }

    #[test]
    fn flush_of_empty_bundle_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = OutputBundle::new();
        let written = flush(&bundle, dir.path(), "boot", NamingMode::Extended).unwrap();
        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
