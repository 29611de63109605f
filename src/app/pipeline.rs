// logtriage - app/pipeline.rs
//
// Orchestration of a full analysis run and the file-level cleaning
// operations. This is the layer front-ends call; the core stays pure
// and stateless.

use crate::core::classify::RuleSet;
use crate::core::junk::{CleanStats, JunkPolicy};
use crate::core::model::RunSummary;
use crate::core::split::{self, NamingMode};
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{Result, TriageError};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Remove junk lines before classification.
    pub clean: bool,

    /// Junk thresholds (used only when `clean` is set).
    pub junk: JunkPolicy,

    /// Classification rule table.
    pub rules: RuleSet,

    /// Output directory for category files. Defaults to the input
    /// file's directory.
    pub output_dir: Option<PathBuf>,

    /// Output filename prefix (extended mode). Defaults to the input
    /// file's stem.
    pub prefix: Option<String>,

    /// Output naming scheme.
    pub naming: NamingMode,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            clean: false,
            junk: JunkPolicy::default(),
            rules: RuleSet::builtin(),
            output_dir: None,
            prefix: None,
            naming: NamingMode::Extended,
        }
    }
}

/// Run the full pipeline on one input file: read, optionally clean,
/// classify, split, and flush category files.
pub fn analyze_file(input: &Path, options: &AnalyzeOptions) -> Result<RunSummary> {
    let started = Instant::now();

    let all_lines =
        fs::read_lines_lossy(input).map_err(|e| TriageError::io(input, "read input file", e))?;
    let total_lines = all_lines.len();

    let lines = if options.clean {
        options.junk.clean(&all_lines)
    } else {
        all_lines
    };
    let junk_removed = total_lines - lines.len();

    let bundle = split::split(&lines, &options.rules);

    let output_dir = match options.output_dir {
        Some(ref dir) => dir.clone(),
        None => input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
    };
    let prefix = match options.prefix {
        Some(ref p) => p.clone(),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string()),
    };

    let files_written = split::flush(&bundle, &output_dir, &prefix, options.naming)?;

    let summary = RunSummary {
        input: input.to_path_buf(),
        total_lines,
        junk_removed,
        lines_by_category: bundle.counts(),
        files_written,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    tracing::info!(
        input = %summary.input.display(),
        lines = summary.total_lines,
        junk_removed = summary.junk_removed,
        files = summary.files_written.len(),
        duration_ms = summary.duration_ms,
        "Analysis run complete"
    );

    Ok(summary)
}

/// Clean a file (in place or to a `<stem>_cleaned` copy), then analyse
/// the cleaned result. Returns the path analysed and a summary whose
/// `input`, `total_lines`, and `junk_removed` describe the *original*
/// file, so counts are not skewed by the copy already being clean.
pub fn clean_and_analyze(
    input: &Path,
    in_place: bool,
    options: &AnalyzeOptions,
) -> Result<(PathBuf, RunSummary)> {
    let (target, stats) = if in_place {
        let stats = clean_file_in_place(input, &options.junk)?;
        (input.to_path_buf(), stats)
    } else {
        clean_file_to_copy(input, &options.junk)?
    };

    // Junk is already gone from `target`.
    let analyze_options = AnalyzeOptions {
        clean: false,
        ..options.clone()
    };
    let mut summary = analyze_file(&target, &analyze_options)?;
    summary.input = input.to_path_buf();
    summary.total_lines = stats.total;
    summary.junk_removed = stats.removed;

    Ok((target, summary))
}

// =============================================================================
// File-level cleaning
// =============================================================================

/// Remove junk lines from a file, overwriting it in place.
///
/// The cleaned content is staged in a temporary file and renamed over
/// the original, so a failure never leaves the file partially
/// truncated. The original line-ending convention is preserved.
pub fn clean_file_in_place(path: &Path, policy: &JunkPolicy) -> Result<CleanStats> {
    let content =
        fs::read_to_string_lossy(path).map_err(|e| TriageError::io(path, "read file", e))?;
    let (cleaned, stats) = policy.clean_content(&content);
    fs::write_atomic(path, cleaned.as_bytes())
        .map_err(|e| TriageError::io(path, "rewrite cleaned file", e))?;

    tracing::info!(
        file = %path.display(),
        removed = stats.removed,
        total = stats.total,
        "Cleaned file in place"
    );
    Ok(stats)
}

/// Remove junk lines from a file, writing the result to a sibling
/// `<stem>_cleaned<ext>` copy. The copy name is de-duplicated with a
/// numeric suffix when it already exists. Returns the path written.
pub fn clean_file_to_copy(path: &Path, policy: &JunkPolicy) -> Result<(PathBuf, CleanStats)> {
    let content =
        fs::read_to_string_lossy(path).map_err(|e| TriageError::io(path, "read file", e))?;
    let (cleaned, stats) = policy.clean_content(&content);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let candidate = path.with_file_name(format!(
        "{stem}{}{ext}",
        constants::CLEANED_COPY_SUFFIX
    ));
    let out_path = unique_path(candidate);

    fs::write_atomic(&out_path, cleaned.as_bytes())
        .map_err(|e| TriageError::io(&out_path, "write cleaned copy", e))?;

    tracing::info!(
        file = %path.display(),
        output = %out_path.display(),
        removed = stats.removed,
        total = stats.total,
        "Cleaned file to copy"
    );
    Ok((out_path, stats))
}

/// Return `p` if unused, otherwise the first `<stem>_<n><ext>` that
/// does not exist yet, falling back to a timestamp suffix when the
/// numeric attempts are exhausted.
fn unique_path(p: PathBuf) -> PathBuf {
    if !fs::exists(&p) {
        return p;
    }

    let stem = p
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let ext = p
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for i in 1..constants::MAX_UNIQUE_PATH_ATTEMPTS {
        let candidate = p.with_file_name(format!("{stem}_{i}{ext}"));
        if !fs::exists(&candidate) {
            return candidate;
        }
    }

    let epoch_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    p.with_file_name(format!("{stem}_{epoch_secs}{ext}"))
}
