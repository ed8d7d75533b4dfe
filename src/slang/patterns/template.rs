//! Capture templates
//!
//! Replacement templates use the Python `re.sub` conventions that mapping
//! files are written in:
//!
//! - `\1` .. `\99` reference a group by position
//! - `\g<1>` and `\g<name>` reference a group by position or name
//! - `\n`, `\t`, `\r` and `\\` are the usual escapes
//!
//! Any other backslash sequence is kept verbatim. A reference to a group that
//! did not participate in the match, or does not exist, expands to nothing.

use regex::Captures;

/// Reference to a capture group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Text(String),
    Group(GroupRef),
}

/// A parsed replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                text.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some(d @ '1'..='9') => {
                    chars.next();
                    let mut index = d.to_digit(10).unwrap_or(0) as usize;
                    if let Some(e) = chars.peek().and_then(|e| e.to_digit(10)) {
                        chars.next();
                        index = index * 10 + e as usize;
                    }
                    flush(&mut parts, &mut text);
                    parts.push(TemplatePart::Group(GroupRef::Index(index)));
                }
                Some('g') => {
                    let rest: String = chars.clone().skip(1).collect();
                    match rest
                        .strip_prefix('<')
                        .and_then(|r| r.find('>').map(|end| r[..end].to_string()))
                    {
                        Some(name) if !name.is_empty() => {
                            // 'g', '<', name, '>'
                            for _ in 0..name.chars().count() + 3 {
                                chars.next();
                            }
                            flush(&mut parts, &mut text);
                            let group = match name.parse::<usize>() {
                                Ok(index) => GroupRef::Index(index),
                                Err(_) => GroupRef::Name(name),
                            };
                            parts.push(TemplatePart::Group(group));
                        }
                        _ => text.push('\\'),
                    }
                }
                Some('n') => {
                    chars.next();
                    text.push('\n');
                }
                Some('t') => {
                    chars.next();
                    text.push('\t');
                }
                Some('r') => {
                    chars.next();
                    text.push('\r');
                }
                Some('\\') => {
                    chars.next();
                    text.push('\\');
                }
                _ => text.push('\\'),
            }
        }

        flush(&mut parts, &mut text);
        Self { parts }
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    pub fn has_groups(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, TemplatePart::Group(_)))
    }

    /// The template with every group placeholder removed
    pub fn literal_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                TemplatePart::Text(t) => Some(t.as_str()),
                TemplatePart::Group(_) => None,
            })
            .collect()
    }

    /// Expand against a match; missing groups become empty strings
    pub fn expand(&self, caps: &Captures<'_>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Text(t) => out.push_str(t),
                TemplatePart::Group(GroupRef::Index(i)) => {
                    if let Some(m) = caps.get(*i) {
                        out.push_str(m.as_str());
                    }
                }
                TemplatePart::Group(GroupRef::Name(name)) => {
                    if let Some(m) = caps.name(name) {
                        out.push_str(m.as_str());
                    }
                }
            }
        }
        out
    }
}

fn flush(parts: &mut Vec<TemplatePart>, text: &mut String) {
    if !text.is_empty() {
        parts.push(TemplatePart::Text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn text(s: &str) -> TemplatePart {
        TemplatePart::Text(s.to_string())
    }

    fn group(i: usize) -> TemplatePart {
        TemplatePart::Group(GroupRef::Index(i))
    }

    #[test]
    fn test_positional_references() {
        let template = Template::parse(r"import \1 as \2");
        assert_eq!(
            template.parts(),
            &[text("import "), group(1), text(" as "), group(2)]
        );
    }

    #[test]
    fn test_two_digit_reference() {
        assert_eq!(Template::parse(r"\12").parts(), &[group(12)]);
    }

    #[test]
    fn test_g_references() {
        let template = Template::parse(r"\g<1>_\g<name>");
        assert_eq!(
            template.parts(),
            &[
                group(1),
                text("_"),
                TemplatePart::Group(GroupRef::Name("name".to_string()))
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let template = Template::parse(r"a\nb\\c\qd\g");
        assert_eq!(template.parts(), &[text("a\nb\\c\\qd\\g")]);
    }

    #[test]
    fn test_literal_text_strips_groups() {
        assert_eq!(Template::parse(r"import \1").literal_text(), "import ");
        assert!(!Template::parse("assert").has_groups());
    }

    #[test]
    fn test_expand_with_missing_group_is_empty() {
        let re = Regex::new(r"slide\s+(\w+)").unwrap();
        let caps = re.captures("slide os").unwrap();
        assert_eq!(Template::parse(r"import \1\2!").expand(&caps), "import os!");
    }

    #[test]
    fn test_expand_named_group() {
        let re = Regex::new(r"vibe\s+(?P<what>\w+)").unwrap();
        let caps = re.captures("vibe check").unwrap();
        assert_eq!(Template::parse(r"print(\g<what>)").expand(&caps), "print(check)");
    }
}
