//! Transpiler facade
//!
//! [`Transpiler`] owns the compiled tables of one mapping document and exposes
//! the two directions as total functions:
//!
//! ```rust,ignore
//! use slang::slang::engine::{Transpiler, TranspileOptions};
//!
//! let transpiler = Transpiler::from_path("genz.json", TranspileOptions::default())?;
//! let python = transpiler.to_canonical("slide into os\nvibe_check(no_cap)\n");
//! let slang = transpiler.from_canonical(&python);
//! ```
//!
//! Forward: special patterns → keywords → syntax patches → indentation.
//! Reverse: special patterns (matched on the canonical text) → reverse keywords.
//! The syntax patches are one-way and the indentation rewrite already produced
//! canonical indentation, so neither runs in reverse.

use crate::slang::keywords::KeywordEngine;
use crate::slang::mapping::{ConfigurationError, MappingDocument};
use crate::slang::patterns::PatternEngine;
use crate::slang::transforms::stages::{
    ApplyPatterns, FixSyntax, NormalizeIndentation, ReversePatterns, SubstituteKeywords,
};
use crate::slang::transforms::Transform;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Which way to rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Custom syntax to Python
    #[default]
    ToCanonical,
    /// Python to custom syntax
    FromCanonical,
}

/// Engine switches, usually filled from [`crate::slang::settings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Keep special patterns out of string literals
    pub literal_aware_patterns: bool,
    /// Run the syntax patches and indentation rewrite on the forward path
    pub normalize: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            literal_aware_patterns: true,
            normalize: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TranspileFileError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of [`Transpiler::transpile_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranspileOutcome {
    /// The output was written to this file
    Written(PathBuf),
    /// No output file was given; here is the text
    Text(String),
}

/// A keyword-substitution transpiler for one mapping document
pub struct Transpiler {
    document: MappingDocument,
    forward: Transform<String, String>,
    reverse: Transform<String, String>,
}

impl Transpiler {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        options: TranspileOptions,
    ) -> Result<Self, ConfigurationError> {
        Self::from_document(MappingDocument::from_path(path)?, options)
    }

    /// Compile every table of `document`. Fails without a partial engine.
    pub fn from_document(
        document: MappingDocument,
        options: TranspileOptions,
    ) -> Result<Self, ConfigurationError> {
        let patterns = Arc::new(PatternEngine::new(
            &document.special_patterns,
            options.literal_aware_patterns,
        )?);
        let keywords = Arc::new(KeywordEngine::new(&document.keywords)?);
        let reverse_keywords = Arc::new(KeywordEngine::new(&document.keywords.reversed())?);

        tracing::debug!(
            keywords = keywords.len(),
            patterns = patterns.patterns().len(),
            reversible_patterns = patterns.patterns().iter().filter(|p| p.is_reversible()).count(),
            "transpiler ready"
        );

        let forward = Transform::identity()
            .then(ApplyPatterns::new(patterns.clone()))
            .then(SubstituteKeywords::new(keywords))
            .then_if(options.normalize, FixSyntax)
            .then_if(options.normalize, NormalizeIndentation);

        let reverse = Transform::identity()
            .then(ReversePatterns::new(patterns))
            .then(SubstituteKeywords::new(reverse_keywords));

        Ok(Self {
            document,
            forward,
            reverse,
        })
    }

    pub fn document(&self) -> &MappingDocument {
        &self.document
    }

    /// Custom syntax → Python
    pub fn to_canonical(&self, text: &str) -> String {
        self.forward.run(text.to_string())
    }

    /// Python → custom syntax
    pub fn from_canonical(&self, text: &str) -> String {
        self.reverse.run(text.to_string())
    }

    pub fn transpile(&self, text: &str, direction: Direction) -> String {
        match direction {
            Direction::ToCanonical => self.to_canonical(text),
            Direction::FromCanonical => self.from_canonical(text),
        }
    }

    /// Transpile a file, writing to `output` when given
    pub fn transpile_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        direction: Direction,
    ) -> Result<TranspileOutcome, TranspileFileError> {
        let source = fs::read_to_string(input).map_err(|source| TranspileFileError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        let result = self.transpile(&source, direction);

        match output {
            Some(path) => {
                fs::write(path, result).map_err(|source| TranspileFileError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(TranspileOutcome::Written(path.to_path_buf()))
            }
            None => Ok(TranspileOutcome::Text(result)),
        }
    }
}
