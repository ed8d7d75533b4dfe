//! Surface forms of special patterns
//!
//! The reverse direction has to write a custom-syntax phrase back out, which
//! means turning a regex like `slide\s+into\s+(\w+)` into the phrase
//! `slide into <group 1>`. That only works for a small regex subset:
//!
//! - literal characters and escaped punctuation (`\.`, `\(`)
//! - whitespace classes `\s`, `\s+`, `\s*`, `\s?` (rendered as one space)
//! - zero-width `\b`, `\A`, `\z`, a leading `^` and a trailing `$`
//! - unnested capturing groups, plain or named (`(...)`, `(?P<n>...)`, `(?<n>...)`)
//!
//! Anything else (alternation, quantified literals, classes outside a group,
//! non-capturing or nested groups) has no single surface phrase, and the
//! pattern is treated as forward-only.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfacePart {
    Text(String),
    Group {
        index: usize,
        name: Option<String>,
        /// The group's own sub-pattern, without the surrounding parentheses
        pattern: String,
    },
}

/// The literal phrase a special pattern matches, with holes for its groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceForm {
    parts: Vec<SurfacePart>,
}

impl SurfaceForm {
    /// Derive the surface form of a regex source, if it has one
    pub fn parse(source: &str) -> Option<Self> {
        let chars: Vec<char> = source.chars().collect();
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut group_index = 0;
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    let escaped = *chars.get(i + 1)?;
                    i += 2;
                    match escaped {
                        's' => {
                            if matches!(chars.get(i), Some('+' | '*' | '?')) {
                                i += 1;
                            }
                            text.push(' ');
                        }
                        'b' | 'A' | 'z' => {}
                        c if c.is_ascii_alphanumeric() => return None,
                        c => text.push(c),
                    }
                }
                '(' => {
                    let end = group_end(&chars, i)?;
                    let inner: String = chars[i + 1..end].iter().collect();
                    let (name, pattern) = split_group_name(&inner)?;
                    group_index += 1;
                    if !text.is_empty() {
                        parts.push(SurfacePart::Text(std::mem::take(&mut text)));
                    }
                    parts.push(SurfacePart::Group {
                        index: group_index,
                        name,
                        pattern,
                    });
                    i = end + 1;
                }
                '^' if i == 0 => i += 1,
                '$' if i + 1 == chars.len() => i += 1,
                '.' | '*' | '+' | '?' | '|' | '[' | ']' | '{' | '}' | ')' | '^' | '$' => {
                    return None
                }
                c => {
                    text.push(c);
                    i += 1;
                }
            }
        }

        if !text.is_empty() {
            parts.push(SurfacePart::Text(text));
        }
        Some(Self { parts })
    }

    pub fn parts(&self) -> &[SurfacePart] {
        &self.parts
    }

    pub fn group(&self, index: usize) -> Option<&SurfacePart> {
        self.parts
            .iter()
            .find(|p| matches!(p, SurfacePart::Group { index: i, .. } if *i == index))
    }

    /// Fill the group holes; a group with no value renders as nothing
    pub fn render(&self, values: &HashMap<usize, String>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                SurfacePart::Text(t) => out.push_str(t),
                SurfacePart::Group { index, .. } => {
                    if let Some(value) = values.get(index) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }

    /// The literal words alone, whitespace collapsed (`"slide into"`)
    pub fn phrase(&self) -> String {
        let text: String = self
            .parts
            .iter()
            .map(|p| match p {
                SurfacePart::Text(t) => t.as_str(),
                SurfacePart::Group { .. } => " ",
            })
            .collect();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Index of the `)` closing the group opened at `open`; `None` if the group
/// is unterminated or contains another group.
fn group_end(chars: &[char], open: usize) -> Option<usize> {
    let mut in_class = false;
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => return None,
            ')' if !in_class => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `?P<name>body` / `?<name>body` into its name and body. Other `?`
/// forms are non-capturing or lookaround groups and have no surface.
fn split_group_name(inner: &str) -> Option<(Option<String>, String)> {
    let Some(rest) = inner.strip_prefix('?') else {
        return Some((None, inner.to_string()));
    };
    let rest = rest.strip_prefix('P').unwrap_or(rest);
    let rest = rest.strip_prefix('<')?;
    let end = rest.find('>')?;
    Some((Some(rest[..end].to_string()), rest[end + 1..].to_string()))
}
