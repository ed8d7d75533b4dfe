//! Individual transformation stages
//!
//! Each stage wraps one engine component and implements `Runnable<String, String>`.
//! Stages that need compiled tables share them through `Arc`, so the forward and
//! reverse pipelines of one transpiler reuse the same compiled regexes.

use crate::slang::keywords::KeywordEngine;
use crate::slang::normalize;
use crate::slang::patterns::PatternEngine;
use crate::slang::transforms::Runnable;
use std::sync::Arc;

/// Special patterns, forward
pub struct ApplyPatterns {
    engine: Arc<PatternEngine>,
}

impl ApplyPatterns {
    pub fn new(engine: Arc<PatternEngine>) -> Self {
        Self { engine }
    }
}

impl Runnable<String, String> for ApplyPatterns {
    fn run(&self, input: String) -> String {
        self.engine.apply(&input)
    }
}

/// Special patterns, canonical text back to surface phrases
pub struct ReversePatterns {
    engine: Arc<PatternEngine>,
}

impl ReversePatterns {
    pub fn new(engine: Arc<PatternEngine>) -> Self {
        Self { engine }
    }
}

impl Runnable<String, String> for ReversePatterns {
    fn run(&self, input: String) -> String {
        self.engine.reverse(&input)
    }
}

/// Literal-aware keyword substitution with whichever table the engine holds
pub struct SubstituteKeywords {
    engine: Arc<KeywordEngine>,
}

impl SubstituteKeywords {
    pub fn new(engine: Arc<KeywordEngine>) -> Self {
        Self { engine }
    }
}

impl Runnable<String, String> for SubstituteKeywords {
    fn run(&self, input: String) -> String {
        self.engine.substitute(&input)
    }
}

/// The fixed syntax patches of [`normalize::fix_syntax`]
pub struct FixSyntax;

impl Runnable<String, String> for FixSyntax {
    fn run(&self, input: String) -> String {
        normalize::fix_syntax(&input)
    }
}

/// Four-space indentation rewrite
pub struct NormalizeIndentation;

impl Runnable<String, String> for NormalizeIndentation {
    fn run(&self, input: String) -> String {
        normalize::normalize_indentation(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slang::mapping::KeywordTable;

    #[test]
    fn test_keyword_stage() {
        let table = KeywordTable::new([("rizz", "return")]);
        let stage = SubstituteKeywords::new(Arc::new(KeywordEngine::new(&table).unwrap()));
        assert_eq!(stage.run("rizz 'rizz'".to_string()), "return 'rizz'");
    }

    #[test]
    fn test_pattern_stages() {
        let table = vec![(r"slide\s+into\s+(\w+)".to_string(), r"import \1".to_string())];
        let engine = Arc::new(PatternEngine::new(&table, true).unwrap());
        let forward = ApplyPatterns::new(engine.clone());
        let reverse = ReversePatterns::new(engine);
        let python = forward.run("slide into os".to_string());
        assert_eq!(python, "import os");
        assert_eq!(reverse.run(python), "slide into os");
    }

    #[test]
    fn test_normalizer_stages() {
        assert_eq!(FixSyntax.run("@ cache".to_string()), "@cache");
        assert_eq!(NormalizeIndentation.run("     x".to_string()), "    x");
    }
}
