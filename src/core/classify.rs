// logtriage - core/classify.rs
//
// Line-to-category classification using an ordered token table.
// Core layer: pure logic, no I/O or UI dependencies.
//
// Matching is deliberately substring-based (a token may appear anywhere
// in the line, not necessarily as a whole word), favouring recall over
// precision. Existing categorised output depends on this; do not switch
// to word-boundary matching.

use crate::core::model::Category;
use std::sync::OnceLock;

/// A single classification rule: a case-insensitive token paired with
/// the category it assigns.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Token to search for, held uppercase so matching is a plain
    /// `contains` against the uppercased line.
    token: String,

    /// Category assigned when the token is found.
    category: Category,
}

impl Rule {
    pub fn new(token: impl Into<String>, category: Category) -> Self {
        Self {
            token: token.into().to_uppercase(),
            category,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// Ordered, immutable sequence of classification rules.
///
/// Rule order is significant: rules are tested strictly in sequence and
/// the first match wins, so a line containing tokens from two tiers
/// (e.g. both `ERROR` and `WARN`) always resolves to the earlier tier.
/// Reordering changes classification outcomes silently.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

/// Builtin token table in priority order. `Other` never appears here —
/// it is the no-match fallback.
const BUILTIN_RULES: &[(&str, Category)] = &[
    // Error class
    ("FATAL", Category::Error),
    ("ERROR", Category::Error),
    ("ERR", Category::Error),
    ("INVALID", Category::Error),
    // Warning class
    ("WARN", Category::Warning),
    ("WARNING", Category::Warning),
    // Info
    ("INFO", Category::Info),
    // Debug class
    ("DBG", Category::Debug),
    ("DEBUG", Category::Debug),
    // Success class
    ("SUCCESS", Category::Success),
    ("OK", Category::Success),
    // Platform
    ("MAC", Category::PlatformInfo),
];

impl RuleSet {
    /// Build a rule set from explicit (token, category) pairs, preserving
    /// the given order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The builtin boot-log token table.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_RULES
                .iter()
                .map(|&(token, category)| Rule::new(token, category))
                .collect(),
        )
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a single line. Deterministic and pure: tests rules in
    /// order against the case-normalised line and returns the first
    /// match, or `Category::Other` when no token is found.
    pub fn classify(&self, line: &str) -> Category {
        if line.is_empty() {
            return Category::Other;
        }
        let haystack = line.to_uppercase();
        self.rules
            .iter()
            .find(|rule| haystack.contains(&rule.token))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classify a line using the builtin rule set.
///
/// The builtin set is constructed once and cached for the process
/// lifetime. Callers that need an alternate table construct their own
/// `RuleSet` and call `classify` on it directly.
pub fn classify(line: &str) -> Category {
    static BUILTIN: OnceLock<RuleSet> = OnceLock::new();
    BUILTIN.get_or_init(RuleSet::builtin).classify(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_tokens_classify_as_error() {
        for line in [
            "FATAL: disk error",
            "00:123 ERROR loading kext",
            "ERR(0x1)",
            "OCB: invalid boot entry",
        ] {
            assert_eq!(classify(line), Category::Error, "line: {line}");
        }
    }

    #[test]
    fn error_outranks_warning_when_both_present() {
        assert_eq!(classify("ERROR after WARN recovery"), Category::Error);
        assert_eq!(classify("warn then error"), Category::Error);
    }

    #[test]
    fn warning_outranks_info() {
        assert_eq!(classify("INFO: WARN threshold reached"), Category::Warning);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            classify("warn: low battery"),
            classify("WARN: low battery")
        );
        assert_eq!(classify("Success"), Category::Success);
        assert_eq!(classify("dbg trace"), Category::Debug);
    }

    #[test]
    fn substring_matching_fires_inside_words() {
        // Deliberate over-matching: "ERR" inside "terrain" still counts.
        assert_eq!(classify("terrain loaded"), Category::Error);
        // "MAC" inside "primacy".
        assert_eq!(classify("primacy check passed"), Category::PlatformInfo);
        // "OK" inside "MacBookPro" outranks the later "MAC" rule.
        assert_eq!(classify("Model: MacBookPro16,1"), Category::Success);
    }

    #[test]
    fn unmatched_lines_fall_back_to_other() {
        assert_eq!(classify("booting stage 2"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn success_and_platform_tokens() {
        assert_eq!(classify("OK: done"), Category::Success);
        assert_eq!(classify("MAC address acquired"), Category::PlatformInfo);
    }

    #[test]
    fn alternate_rule_set_is_honoured() {
        let rules = RuleSet::new(vec![
            Rule::new("PANIC", Category::Error),
            Rule::new("NOTE", Category::Info),
        ]);
        assert_eq!(rules.classify("kernel panic imminent"), Category::Error);
        assert_eq!(rules.classify("note: all good"), Category::Info);
        // Builtin tokens are absent from the custom table.
        assert_eq!(rules.classify("FATAL: ignored"), Category::Other);
    }
}
