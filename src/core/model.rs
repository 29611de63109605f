// logtriage - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// and no platform access; the serde derives exist for the JSON run
// summary.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// =============================================================================
// Category
// =============================================================================

/// Severity/class tag assigned to a log line, ordered from most to
/// least severe. Closed set: `Other` is the fallback for lines that
/// match no classification rule and is never matched explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Error,
    Warning,
    Info,
    Debug,
    Success,
    PlatformInfo,
    #[default]
    Other,
}

impl Category {
    /// Number of variants; sized per-category storage indexes by
    /// `Category as usize`.
    pub const COUNT: usize = 7;

    /// Returns all variants in rule-priority order (most severe first).
    pub fn all() -> &'static [Category] {
        &[
            Category::Error,
            Category::Warning,
            Category::Info,
            Category::Debug,
            Category::Success,
            Category::PlatformInfo,
            Category::Other,
        ]
    }

    /// Canonical lowercase label. Also used as the category component of
    /// extended-mode output filenames (`<prefix>_<label>.log`).
    pub fn label(&self) -> &'static str {
        match self {
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Info => "info",
            Category::Debug => "debug",
            Category::Success => "success",
            Category::PlatformInfo => "platform-info",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Classified line
// =============================================================================

/// A single input line together with its assigned category.
/// Immutable once created; produced by the classifier, consumed by
/// the splitter and the tail front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLine {
    /// Original line text, without its terminator.
    pub text: String,

    /// Category assigned by the rule set.
    pub category: Category,
}

// =============================================================================
// Run summary
// =============================================================================

/// Summary statistics for a completed analysis run (clean + split + flush).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// The input file analysed.
    pub input: PathBuf,

    /// Total lines read from the input (before cleaning).
    pub total_lines: usize,

    /// Junk lines removed by the cleaner (0 when cleaning was disabled).
    pub junk_removed: usize,

    /// Classified line counts by category (including zero-line categories).
    pub lines_by_category: HashMap<Category, usize>,

    /// Category files written by the flush step.
    pub files_written: Vec<PathBuf>,

    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_match_output_names() {
        assert_eq!(Category::Error.label(), "error");
        assert_eq!(Category::PlatformInfo.label(), "platform-info");
        assert_eq!(Category::Other.label(), "other");
    }

    #[test]
    fn category_all_covers_every_variant_once() {
        let all = Category::all();
        assert_eq!(all.len(), 7);
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn category_serialises_as_kebab_case() {
        let json = serde_json::to_string(&Category::PlatformInfo).unwrap();
        assert_eq!(json, "\"platform-info\"");
    }
}
