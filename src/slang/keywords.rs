//! Keyword substitution engine
//!
//! Replaces whole-word keyword occurrences in CODE segments, longest keyword
//! first. The same engine runs in both directions; only the table differs.
//!
//! Word boundaries follow the regex `\b` rule: a transition between a word
//! character (alphanumeric or `_`) and anything else, checked on both sides of
//! the keyword.
//!
//! Each keyword pass runs over the output of the previous pass. Trying longer
//! keywords first keeps `no_cap` from turning into `noFalse`, but it does not
//! stop a shorter keyword from matching a word that an earlier replacement
//! introduced (`yeet_it` → `raise` followed by `raise` → `throw`, for example).
//! Tables with such chains are not rejected.

use crate::slang::mapping::{ConfigurationError, KeywordTable};
use crate::slang::segments::{self, Segment, SegmentKind};
use regex::{NoExpand, Regex};

struct KeywordRule {
    pattern: Regex,
    replacement: String,
}

/// Compiled keyword rules in descending keyword-length order
pub struct KeywordEngine {
    rules: Vec<KeywordRule>,
}

impl KeywordEngine {
    /// Compile one word-bounded pattern per table entry.
    ///
    /// Empty keywords are dropped since they would match at every boundary.
    pub fn new(table: &KeywordTable) -> Result<Self, ConfigurationError> {
        let mut rules = Vec::with_capacity(table.len());
        for (keyword, replacement) in table.sorted_by_length() {
            if keyword.is_empty() {
                tracing::warn!(replacement, "ignoring empty keyword");
                continue;
            }
            let source = format!(r"\b{}\b", regex::escape(keyword));
            let pattern =
                Regex::new(&source).map_err(|source| ConfigurationError::InvalidPattern {
                    pattern: keyword.to_string(),
                    source,
                })?;
            rules.push(KeywordRule {
                pattern,
                replacement: replacement.to_string(),
            });
        }
        Ok(Self { rules })
    }

    /// Substitute keywords outside string literals
    pub fn substitute(&self, text: &str) -> String {
        self.substitute_segments(&segments::split(text))
    }

    /// Substitute keywords in the CODE segments, passing LITERAL segments through
    pub fn substitute_segments(&self, segments: &[Segment<'_>]) -> String {
        let mut out = String::new();
        for segment in segments {
            match segment.kind {
                SegmentKind::Code => out.push_str(&self.substitute_code(segment.text)),
                SegmentKind::Literal => out.push_str(segment.text),
            }
        }
        out
    }

    /// Substitute keywords in text known to contain no literals
    pub fn substitute_code(&self, code: &str) -> String {
        let mut current = code.to_string();
        for rule in &self.rules {
            if rule.pattern.is_match(&current) {
                current = rule
                    .pattern
                    .replace_all(&current, NoExpand(&rule.replacement))
                    .into_owned();
            }
        }
        current
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
