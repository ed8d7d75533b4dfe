//! Syntax and indentation normalizer
//!
//! Runs after keyword substitution on the forward path. Two parts:
//!
//! 1. [`fix_syntax`]: a short, ordered list of patches for mismatches that
//!    naive word substitution is known to leave behind. They are specific to
//!    the shipped keyword tables, not general rules.
//! 2. [`normalize_indentation`]: rewrites every line's leading spaces to a
//!    multiple of four.
//!
//! Both are total and idempotent: normalizing normalized text changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Width of one indentation level
pub const INDENT_UNIT: &str = "    ";

/// `@ name` at the start of a line, left by tables that map a word to `@`
static SPACED_DECORATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)@[ \t]+").expect("decorator pattern is valid"));

/// Literal (match, replacement) patches, applied in order after the decorator fix.
///
/// - the entry-point guard with an unquoted `__main__`
/// - `builtins.`-qualified container types
/// - `Error`, which slang tables use as an alias, in `except` clauses
pub const LITERAL_FIXUPS: &[(&str, &str)] = &[
    ("if __name__ == __main__:", "if __name__ == \"__main__\":"),
    ("builtins.list", "list"),
    ("builtins.dict", "dict"),
    ("builtins.set", "set"),
    ("builtins.tuple", "tuple"),
    ("except Error:", "except Exception:"),
    ("except Error as ", "except Exception as "),
];

/// Apply the syntax patches and then the indentation rewrite
pub fn normalize(text: &str) -> String {
    normalize_indentation(&fix_syntax(text))
}

/// Apply the decorator fix and [`LITERAL_FIXUPS`], in that order
pub fn fix_syntax(text: &str) -> String {
    let mut out = SPACED_DECORATOR.replace_all(text, "${1}@").into_owned();
    // Stripping a prefix can splice a new match together ("builtins.builtins.list"),
    // so repeat until nothing applies. No replacement contains a match pattern,
    // so every pass removes matches and the loop ends.
    let mut changed = true;
    while changed {
        changed = false;
        for (from, to) in LITERAL_FIXUPS {
            if out.contains(from) {
                out = out.replace(from, to);
                changed = true;
            }
        }
    }
    out
}

/// Re-indent each line to `leading spaces / 4` levels of [`INDENT_UNIT`].
///
/// Leading spaces that do not make a full level are dropped, so five spaces
/// become four. Tabs are not counted and are trimmed away with the rest of the
/// surrounding whitespace, as is a trailing `\r`.
pub fn normalize_indentation(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            let level = spaces / INDENT_UNIT.len();
            format!("{}{}", INDENT_UNIT.repeat(level), line.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
