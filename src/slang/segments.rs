//! String-literal splitter
//!
//! Partitions source text into alternating CODE and LITERAL segments so that
//! substitution passes never touch the contents of quoted strings.
//!
//! ## Recognized literals
//!
//! - `"..."` and `'...'`, each honoring backslash escapes: `\"` inside a
//!   double-quoted literal is part of the literal, not its terminator.
//! - A literal never spans an unescaped newline. An unmatched quote (an
//!   apostrophe in a comment, say) stays in the surrounding CODE segment.
//!
//! ## Known gap
//!
//! Triple-quoted literals are not a single unit. `"""doc"""` is seen as the
//! empty literal `""`, the literal `"doc"` and another empty literal `""`.
//! Text between those pieces is still classified by the pairing above, so a
//! docstring containing a lone quote can leak keywords into CODE.
//!
//! ## Invariant
//!
//! Splitting is lossless: concatenating every segment's text, in order,
//! reproduces the input byte for byte. Every substitution stage relies on it.

use once_cell::sync::Lazy;
use regex::Regex;

static LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#)
        .expect("literal pattern is valid")
});

/// Classification of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Code,
    Literal,
}

/// A classified, contiguous span of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    pub fn code(text: &'a str) -> Self {
        Self {
            kind: SegmentKind::Code,
            text,
        }
    }

    pub fn literal(text: &'a str) -> Self {
        Self {
            kind: SegmentKind::Literal,
            text,
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }
}

/// Split `text` into CODE and LITERAL segments.
///
/// Empty CODE runs between adjacent literals are not emitted, so the result
/// for an empty input is an empty vector.
pub fn split(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for literal in LITERAL.find_iter(text) {
        if literal.start() > cursor {
            segments.push(Segment::code(&text[cursor..literal.start()]));
        }
        segments.push(Segment::literal(literal.as_str()));
        cursor = literal.end();
    }

    if cursor < text.len() {
        segments.push(Segment::code(&text[cursor..]));
    }

    segments
}

/// Concatenate segments back into a single string
pub fn join(segments: &[Segment<'_>]) -> String {
    segments.iter().map(|s| s.text).collect()
}

/// Rewrite every CODE segment of `text` with `rewrite`, passing literals through.
pub fn map_code<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    for segment in split(text) {
        match segment.kind {
            SegmentKind::Code => out.push_str(&rewrite(segment.text)),
            SegmentKind::Literal => out.push_str(segment.text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(SegmentKind, &str)> {
        split(text).into_iter().map(|s| (s.kind, s.text)).collect()
    }

    #[test]
    fn test_plain_code_is_one_segment() {
        assert_eq!(kinds("x = 1"), vec![(SegmentKind::Code, "x = 1")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split("").is_empty());
    }

    #[test]
    fn test_double_and_single_quotes() {
        assert_eq!(
            kinds(r#"say("hi", 'yo')"#),
            vec![
                (SegmentKind::Code, "say("),
                (SegmentKind::Literal, "\"hi\""),
                (SegmentKind::Code, ", "),
                (SegmentKind::Literal, "'yo'"),
                (SegmentKind::Code, ")"),
            ]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_terminate() {
        let text = r#"x = "a \"rizz\" b" + y"#;
        assert_eq!(
            kinds(text),
            vec![
                (SegmentKind::Code, "x = "),
                (SegmentKind::Literal, r#""a \"rizz\" b""#),
                (SegmentKind::Code, " + y"),
            ]
        );
    }

    #[test]
    fn test_other_quote_kind_inside_literal() {
        assert_eq!(
            kinds(r#""it's""#),
            vec![(SegmentKind::Literal, r#""it's""#)]
        );
    }

    #[test]
    fn test_unterminated_quote_stays_code() {
        let text = "# don't panic\nx = 1\n";
        assert_eq!(kinds(text), vec![(SegmentKind::Code, text)]);
    }

    #[test]
    fn test_adjacent_literals_have_no_empty_code() {
        assert_eq!(
            kinds(r#""a""b""#),
            vec![
                (SegmentKind::Literal, "\"a\""),
                (SegmentKind::Literal, "\"b\""),
            ]
        );
    }

    #[test]
    fn test_triple_quotes_split_into_pieces() {
        assert_eq!(
            kinds(r#""""doc""""#),
            vec![
                (SegmentKind::Literal, "\"\""),
                (SegmentKind::Literal, "\"doc\""),
                (SegmentKind::Literal, "\"\""),
            ]
        );
    }

    #[test]
    fn test_join_is_lossless() {
        let text = "a = 'x' + \"y\\\"z\" # it's\n";
        assert_eq!(join(&split(text)), text);
    }

    #[test]
    fn test_map_code_skips_literals() {
        let out = map_code(r#"rizz "rizz" rizz"#, |code| code.replace("rizz", "return"));
        assert_eq!(out, r#"return "rizz" return"#);
    }
}
