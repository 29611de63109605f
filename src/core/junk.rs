// logtriage - core/junk.rs
//
// Junk-line heuristics and the cleaning pass built on them.
// Core layer: pure logic, no I/O. File-level cleaning (in-place
// rewrite) lives in app::pipeline.
//
// Boot logs frequently contain stray binary output: NUL runs from
// firmware serial capture and long stretches of control characters.
// These heuristics drop such lines before classification.

use crate::util::constants;

/// Thresholds for junk detection. Defaults come from named constants;
/// the `[junk]` config section can override them.
#[derive(Debug, Clone, Copy)]
pub struct JunkPolicy {
    /// NUL fraction strictly above this marks a line as junk.
    pub max_nul_fraction: f64,

    /// Minimum line length before the visible-density check applies.
    pub density_min_len: usize,

    /// Visible-character fraction below this (on long lines) marks junk.
    pub min_visible_fraction: f64,
}

impl Default for JunkPolicy {
    fn default() -> Self {
        Self {
            max_nul_fraction: constants::JUNK_MAX_NUL_FRACTION,
            density_min_len: constants::JUNK_DENSITY_MIN_LEN,
            min_visible_fraction: constants::JUNK_MIN_VISIBLE_FRACTION,
        }
    }
}

/// Counts from a cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Lines examined.
    pub total: usize,

    /// Lines removed as junk.
    pub removed: usize,
}

impl JunkPolicy {
    /// Decide whether a line is low-value ("junk").
    ///
    /// Rules, evaluated in order, any true means junk:
    ///   1. empty or whitespace-only;
    ///   2. NUL-character fraction strictly above `max_nul_fraction`;
    ///   3. longer than `density_min_len` with a visible-character
    ///      fraction below `min_visible_fraction`.
    ///
    /// Trailing CR/LF is ignored for all measurements. Pure, no I/O.
    pub fn is_junk(&self, line: &str) -> bool {
        let raw = line.trim_end_matches(['\n', '\r']);

        if raw.trim().is_empty() {
            return true;
        }

        let len = raw.chars().count();
        let nuls = raw.chars().filter(|&c| c == '\0').count();
        if nuls as f64 / len as f64 > self.max_nul_fraction {
            return true;
        }

        if len > self.density_min_len {
            let visible = raw
                .chars()
                .filter(|c| !c.is_whitespace() && !c.is_control())
                .count();
            if (visible as f64 / len as f64) < self.min_visible_fraction {
                return true;
            }
        }

        false
    }

    /// Remove junk lines, preserving the relative order of kept lines.
    /// Idempotent: cleaning already-clean input is a no-op.
    pub fn clean(&self, lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter(|line| !self.is_junk(line))
            .cloned()
            .collect()
    }

    /// Clean a whole file's content, preserving its line-ending
    /// convention (CRLF vs LF) and the presence of a final terminator.
    ///
    /// Pure counterpart of the in-place file rewrite in `app::pipeline`.
    pub fn clean_content(&self, content: &str) -> (String, CleanStats) {
        let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let had_final_terminator = content.ends_with('\n');

        let mut stats = CleanStats::default();
        let mut kept: Vec<&str> = Vec::new();
        for line in content.lines() {
            stats.total += 1;
            if self.is_junk(line) {
                stats.removed += 1;
            } else {
                kept.push(line);
            }
        }

        let mut cleaned = kept.join(eol);
        if had_final_terminator && !cleaned.is_empty() {
            cleaned.push_str(eol);
        }
        (cleaned, stats)
    }
}

/// Junk verdict for a line under the default policy.
pub fn is_junk(line: &str) -> bool {
    JunkPolicy::default().is_junk(line)
}

/// Remove junk lines under the default policy, preserving order.
pub fn clean(lines: &[String]) -> Vec<String> {
    JunkPolicy::default().clean(lines)
}
