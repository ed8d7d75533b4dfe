//! Property-based tests for the rewriting stages

use proptest::prelude::*;
use slang::slang::mapping::MappingDocument;
use slang::slang::normalize::normalize;
use slang::slang::segments;
use slang::{TranspileOptions, Transpiler};

fn one_to_one() -> Transpiler {
    let document = MappingDocument::from_json_str(
        r#"{"keywords": {"vibe": "def", "rizz": "return", "bet": "if", "yap": "print", "no_cap": "True", "cap": "False"}}"#,
    )
    .unwrap();
    Transpiler::from_document(document, TranspileOptions::default()).unwrap()
}

/// Lines of Python-ish text with quotes, indentation and decorators
fn source_text() -> impl Strategy<Value = String> {
    "[ a-z_:@\"'\\\\\t\n]{0,80}"
}

/// A single line of canonical words and neutral identifiers
fn canonical_line() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "def", "return", "if", "print", "True", "False", "x", "area", "(", ")", ":",
        ]),
        0..12,
    )
    .prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn split_then_join_is_lossless(text in any::<String>()) {
        prop_assert_eq!(segments::join(&segments::split(&text)), text);
    }

    #[test]
    fn literal_segments_are_quoted(text in source_text()) {
        for segment in segments::split(&text) {
            if !segment.is_code() {
                let first = segment.text.chars().next().unwrap();
                prop_assert!(first == '"' || first == '\'');
                prop_assert!(segment.text.ends_with(first));
            }
        }
    }

    #[test]
    fn normalize_is_idempotent(text in source_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn keywords_invert_on_one_to_one_tables(line in canonical_line()) {
        let t = one_to_one();
        let custom = t.from_canonical(&line);
        prop_assert_eq!(t.to_canonical(&custom), line);
    }
}
