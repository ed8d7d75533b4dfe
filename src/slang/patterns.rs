//! Special-pattern engine
//!
//! Phrase-level rewrites driven by the `special_patterns` table: each entry is a
//! regex source and a capture template, e.g.
//!
//! ```text
//! "slide\\s+into\\s+(\\w+)": "import \\1"      slide into os  →  import os
//! "no\\s+shot": "assert"                       no shot x > 0  →  assert x > 0
//! ```
//!
//! Patterns run in table order, each over the output of the previous one, and
//! before keyword substitution.
//!
//! ## Forward
//!
//! Every match is replaced by the expanded template. The engine either rewrites
//! the whole text or, when literal-aware, only the CODE segments.
//!
//! ## Reverse
//!
//! The reverse rule for a pattern is derived once at construction:
//!
//! 1. the template's literal text becomes the match side, whitespace runs
//!    loosened to `\s+`, with each placeholder replaced by the sub-pattern of
//!    the source group it refers to (`import\s+(\w+)`);
//! 2. the pattern's [`SurfaceForm`] becomes the replacement, its group holes
//!    filled with what the reverse match captured (`slide into <os>`).
//!
//! A template without placeholders degenerates into a literal swap of the
//! template text for the surface phrase. Patterns whose regex has no surface
//! form, whose template has no literal text to anchor on, or whose template
//! drops one of the source groups are forward-only.
//!
//! Reverse rules run in the opposite order to the table, undoing the last
//! forward rewrite first.
//!
//! Reverse matching runs over canonical text, so a captured value is whatever
//! the canonical side says. Only identifier-like captures that no keyword
//! rewrites survive a round trip unchanged.

pub mod surface;
pub mod template;

pub use surface::{SurfaceForm, SurfacePart};
pub use template::{GroupRef, Template, TemplatePart};

use crate::slang::mapping::ConfigurationError;
use crate::slang::segments;
use regex::{Captures, Regex};
use std::collections::HashMap;

struct ReverseRule {
    regex: Regex,
    /// Source group index for each capture of `regex`, in order
    groups: Vec<usize>,
    surface: SurfaceForm,
}

/// One compiled `special_patterns` entry
pub struct SpecialPattern {
    source: String,
    regex: Regex,
    template_source: String,
    template: Template,
    surface: Option<SurfaceForm>,
    reverse: Option<ReverseRule>,
}

impl SpecialPattern {
    pub fn new(source: &str, template: &str) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(source).map_err(|e| ConfigurationError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        let parsed = Template::parse(template);
        let surface = SurfaceForm::parse(source);
        let reverse = surface
            .as_ref()
            .and_then(|form| reverse_rule(&regex, &parsed, form));

        if reverse.is_none() {
            tracing::debug!(pattern = source, "special pattern is forward-only");
        }

        Ok(Self {
            source: source.to_string(),
            regex,
            template_source: template.to_string(),
            template: parsed,
            surface,
            reverse,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn template_source(&self) -> &str {
        &self.template_source
    }

    pub fn surface(&self) -> Option<&SurfaceForm> {
        self.surface.as_ref()
    }

    pub fn is_reversible(&self) -> bool {
        self.reverse.is_some()
    }

    /// Replace every match with the expanded template
    pub fn apply(&self, text: &str) -> String {
        self.regex
            .replace_all(text, |caps: &Captures<'_>| self.template.expand(caps))
            .into_owned()
    }

    /// Rewrite canonical occurrences back into the surface phrase
    pub fn reverse(&self, text: &str) -> String {
        let Some(rule) = &self.reverse else {
            return text.to_string();
        };
        rule.regex
            .replace_all(text, |caps: &Captures<'_>| {
                let mut values = HashMap::new();
                for (position, index) in rule.groups.iter().enumerate() {
                    if let Some(m) = caps.get(position + 1) {
                        values
                            .entry(*index)
                            .or_insert_with(|| m.as_str().to_string());
                    }
                }
                rule.surface.render(&values)
            })
            .into_owned()
    }
}

fn reverse_rule(regex: &Regex, template: &Template, surface: &SurfaceForm) -> Option<ReverseRule> {
    let literal = template.literal_text();
    if literal.trim().is_empty() {
        return None;
    }

    let mut pattern = String::new();
    let mut groups = Vec::new();
    for part in template.parts() {
        match part {
            TemplatePart::Text(text) => push_loose_literal(&mut pattern, text),
            TemplatePart::Group(group) => {
                let index = resolve_group(regex, group)?;
                let SurfacePart::Group {
                    pattern: sub_pattern,
                    ..
                } = surface.group(index)?
                else {
                    return None;
                };
                pattern.push('(');
                pattern.push_str(sub_pattern);
                pattern.push(')');
                groups.push(index);
            }
        }
    }

    // A source group the template drops cannot be recovered from canonical text
    let all_groups_recovered = surface.parts().iter().all(|part| match part {
        SurfacePart::Group { index, .. } => groups.contains(index),
        SurfacePart::Text(_) => true,
    });
    if !all_groups_recovered {
        return None;
    }

    let starts_with_word = matches!(
        template.parts().first(),
        Some(TemplatePart::Text(t)) if t.chars().next().is_some_and(is_word_char)
    );
    let ends_with_word = matches!(
        template.parts().last(),
        Some(TemplatePart::Text(t)) if t.chars().last().is_some_and(is_word_char)
    );
    if starts_with_word {
        pattern.insert_str(0, r"\b");
    }
    if ends_with_word {
        pattern.push_str(r"\b");
    }

    let regex = Regex::new(&pattern).ok()?;
    Some(ReverseRule {
        regex,
        groups,
        surface: surface.clone(),
    })
}

fn resolve_group(regex: &Regex, group: &GroupRef) -> Option<usize> {
    match group {
        GroupRef::Index(index) => Some(*index),
        GroupRef::Name(name) => regex
            .capture_names()
            .position(|n| n == Some(name.as_str())),
    }
}

/// Escape `text` for a regex, turning each whitespace run into `\s+`
fn push_loose_literal(pattern: &mut String, text: &str) {
    let mut run = String::new();
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                pattern.push_str(&regex::escape(&run));
                run.clear();
                pattern.push_str(r"\s+");
                in_space = true;
            }
        } else {
            in_space = false;
            run.push(c);
        }
    }
    pattern.push_str(&regex::escape(&run));
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The compiled `special_patterns` table
pub struct PatternEngine {
    patterns: Vec<SpecialPattern>,
    literal_aware: bool,
}

impl PatternEngine {
    pub fn new(table: &[(String, String)], literal_aware: bool) -> Result<Self, ConfigurationError> {
        let patterns = table
            .iter()
            .map(|(source, template)| SpecialPattern::new(source, template))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            literal_aware,
        })
    }

    pub fn patterns(&self) -> &[SpecialPattern] {
        &self.patterns
    }

    pub fn is_literal_aware(&self) -> bool {
        self.literal_aware
    }

    /// Apply every pattern forward, in table order
    pub fn apply(&self, text: &str) -> String {
        self.patterns.iter().fold(text.to_string(), |acc, pattern| {
            self.rewrite(&acc, |code| pattern.apply(code))
        })
    }

    /// Apply every reversible pattern backward, last table entry first, so
    /// that text produced by a later pattern is undone before an earlier
    /// pattern's reverse rule can see it
    pub fn reverse(&self, text: &str) -> String {
        self.patterns.iter().rev().fold(text.to_string(), |acc, pattern| {
            self.rewrite(&acc, |code| pattern.reverse(code))
        })
    }

    fn rewrite<F>(&self, text: &str, rewrite: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        if self.literal_aware {
            segments::map_code(text, rewrite)
        } else {
            let mut rewrite = rewrite;
            rewrite(text)
        }
    }
}
