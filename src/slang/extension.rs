//! VS Code extension scaffold
//!
//! Builds a syntax-highlighting extension for a mapping document:
//!
//! ```text
//! vscode-<id>/
//!     package.json
//!     language-configuration.json
//!     syntaxes/<id>.tmLanguage.json
//!     README.md
//! ```
//!
//! Generation is a pure function of the document; only [`ExtensionScaffold::write_to`]
//! touches the filesystem. Custom keywords are highlighted according to the
//! Python token they stand for, so `bet` (→ `if`) is colored as control flow.

use crate::slang::mapping::MappingDocument;
use crate::slang::patterns::surface::SurfaceForm;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("failed to serialize {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Highlight groups, in grammar order, with their TextMate scope prefix
const GROUPS: &[(&str, &str)] = &[
    ("control", "keyword.control"),
    ("declaration", "keyword.declaration"),
    ("operator", "keyword.operator"),
    ("constant", "constant.language"),
    ("builtin", "support.function"),
    ("storage", "storage.modifier"),
    ("exception", "keyword.control.exception"),
];

const FALLBACK_GROUP: &str = "builtin";

static PYTHON_GROUPS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("if", "control"),
        ("elif", "control"),
        ("else", "control"),
        ("for", "control"),
        ("while", "control"),
        ("break", "control"),
        ("continue", "control"),
        ("return", "control"),
        ("pass", "control"),
        ("yield", "control"),
        ("match", "control"),
        ("case", "control"),
        ("def", "declaration"),
        ("class", "declaration"),
        ("lambda", "declaration"),
        ("import", "declaration"),
        ("from", "declaration"),
        ("as", "declaration"),
        ("with", "declaration"),
        ("async", "declaration"),
        ("await", "declaration"),
        ("and", "operator"),
        ("or", "operator"),
        ("not", "operator"),
        ("in", "operator"),
        ("is", "operator"),
        ("del", "operator"),
        ("True", "constant"),
        ("False", "constant"),
        ("None", "constant"),
        ("global", "storage"),
        ("nonlocal", "storage"),
        ("try", "exception"),
        ("except", "exception"),
        ("finally", "exception"),
        ("raise", "exception"),
        ("assert", "exception"),
        ("Exception", "exception"),
    ]
    .into_iter()
    .collect()
});

/// Highlight group for a canonical token; anything unknown is a builtin
pub fn group_for(canonical: &str) -> &'static str {
    PYTHON_GROUPS
        .get(canonical)
        .copied()
        .unwrap_or(FALLBACK_GROUP)
}

/// One generated file, relative to the extension root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct ExtensionScaffold {
    language_id: String,
    files: Vec<ScaffoldFile>,
}

impl ExtensionScaffold {
    pub fn generate(document: &MappingDocument) -> Result<Self, ScaffoldError> {
        let info = &document.language_info;
        let language_id = language_id(&info.name);
        let extension = info
            .file_extension
            .strip_prefix('.')
            .unwrap_or(&info.file_extension)
            .to_string();

        let groups = keyword_groups(document);
        let files = vec![
            json_file(
                "package.json",
                &package_json(&language_id, &info.name, &info.description, &extension),
            )?,
            json_file("language-configuration.json", &language_configuration())?,
            json_file(
                &format!("syntaxes/{}.tmLanguage.json", language_id),
                &grammar(&language_id, &info.name, &groups),
            )?,
            ScaffoldFile {
                path: PathBuf::from("README.md"),
                contents: readme(&info.name, &extension),
            },
        ];

        Ok(Self { language_id, files })
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    /// `vscode-<id>`, used when no output directory is given
    pub fn default_dir(&self) -> PathBuf {
        PathBuf::from(format!("vscode-{}", self.language_id))
    }

    pub fn files(&self) -> &[ScaffoldFile] {
        &self.files
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&ScaffoldFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }

    /// Write every file under `dir`, creating directories as needed
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ScaffoldError> {
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let path = dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| ScaffoldError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, &file.contents).map_err(|source| ScaffoldError::Write {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }
        tracing::debug!(dir = %dir.display(), files = written.len(), "wrote extension scaffold");
        Ok(written)
    }
}

/// Lowercase name with spaces replaced by `-`
pub fn language_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Custom words per highlight group, in registration order without duplicates
pub fn keyword_groups(document: &MappingDocument) -> Vec<(&'static str, Vec<String>)> {
    let mut groups: Vec<(&'static str, Vec<String>)> =
        GROUPS.iter().map(|(name, _)| (*name, Vec::new())).collect();
    let mut push = |group: &str, word: String| {
        if let Some((_, words)) = groups.iter_mut().find(|(name, _)| *name == group) {
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }
    };

    for (custom, canonical) in document.keywords.iter() {
        push(group_for(canonical), custom.to_string());
    }

    for (source, template) in &document.special_patterns {
        let Some(surface) = SurfaceForm::parse(source) else {
            tracing::debug!(pattern = source.as_str(), "no surface phrase, not highlighted");
            continue;
        };
        let head = template.split_whitespace().next().unwrap_or("");
        push(group_for(head), surface.phrase());
    }

    groups
}

/// `\b(...)\b` over the words, longest first, with whitespace inside a phrase
/// matching any run of whitespace
fn alternation(words: &[String]) -> String {
    let mut sorted: Vec<&String> = words.iter().collect();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    let alternatives: Vec<String> = sorted
        .iter()
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    format!(r"\b({})\b", alternatives.join("|"))
}

fn package_json(id: &str, name: &str, description: &str, extension: &str) -> Value {
    json!({
        "name": id,
        "displayName": name,
        "description": description,
        "version": "0.1.0",
        "engines": { "vscode": "^1.60.0" },
        "categories": ["Programming Languages"],
        "contributes": {
            "languages": [{
                "id": id,
                "aliases": [name],
                "extensions": [format!(".{}", extension)],
                "configuration": "./language-configuration.json"
            }],
            "grammars": [{
                "language": id,
                "scopeName": format!("source.{}", id),
                "path": format!("./syntaxes/{}.tmLanguage.json", id)
            }]
        }
    })
}

fn language_configuration() -> Value {
    json!({
        "comments": { "lineComment": "#" },
        "brackets": [["{", "}"], ["[", "]"], ["(", ")"]],
        "autoClosingPairs": [
            { "open": "{", "close": "}" },
            { "open": "[", "close": "]" },
            { "open": "(", "close": ")" },
            { "open": "\"", "close": "\"", "notIn": ["string"] },
            { "open": "'", "close": "'", "notIn": ["string", "comment"] }
        ],
        "surroundingPairs": [["{", "}"], ["[", "]"], ["(", ")"], ["\"", "\""], ["'", "'"]],
        "indentationRules": {
            "increaseIndentPattern": r"^.*:\s*$",
            "decreaseIndentPattern": r"^\s*$"
        }
    })
}

fn grammar(id: &str, name: &str, groups: &[(&'static str, Vec<String>)]) -> Value {
    let keyword_patterns: Vec<Value> = groups
        .iter()
        .filter(|(_, words)| !words.is_empty())
        .filter_map(|(group, words)| {
            let (_, scope) = GROUPS.iter().find(|(g, _)| g == group)?;
            Some(json!({
                "name": format!("{}.{}", scope, id),
                "match": alternation(words)
            }))
        })
        .collect();

    let escape = json!([{ "name": format!("constant.character.escape.{}", id), "match": r"\\." }]);

    json!({
        "$schema": "https://raw.githubusercontent.com/martinring/tmlanguage/master/tmlanguage.json",
        "name": name,
        "patterns": [
            { "include": "#keywords" },
            { "include": "#strings" },
            { "include": "#comments" },
            { "include": "#numbers" },
            { "include": "#function-call" },
            { "include": "#decorator" }
        ],
        "repository": {
            "keywords": { "patterns": keyword_patterns },
            "strings": {
                "patterns": [
                    {
                        "name": format!("string.quoted.triple.{}", id),
                        "begin": "\"\"\"",
                        "end": "\"\"\"",
                        "patterns": escape
                    },
                    {
                        "name": format!("string.quoted.double.{}", id),
                        "begin": "\"",
                        "end": "\"",
                        "patterns": escape
                    },
                    {
                        "name": format!("string.quoted.single.{}", id),
                        "begin": "'",
                        "end": "'",
                        "patterns": escape
                    }
                ]
            },
            "comments": {
                "patterns": [{ "name": format!("comment.line.number-sign.{}", id), "match": "#.*$" }]
            },
            "numbers": {
                "patterns": [{ "name": format!("constant.numeric.{}", id), "match": r"\b[0-9]+(\.[0-9]+)?\b" }]
            },
            "function-call": {
                "patterns": [{
                    "name": format!("entity.name.function.{}", id),
                    "match": r"\b([a-zA-Z_][a-zA-Z0-9_]*)\s*\("
                }]
            },
            "decorator": {
                "patterns": [{
                    "name": format!("entity.name.function.decorator.{}", id),
                    "match": r"^\s*@[A-Za-z_][A-Za-z0-9_.]*"
                }]
            }
        },
        "scopeName": format!("source.{}", id)
    })
}

fn readme(name: &str, extension: &str) -> String {
    format!(
        "# {name} VS Code Extension\n\n\
         This extension provides syntax highlighting for {name} files (`.{extension}`).\n\n\
         ## Installation\n\n\
         Copy this directory into `~/.vscode/extensions/` and restart VS Code.\n"
    )
}

fn json_file(path: &str, value: &Value) -> Result<ScaffoldFile, ScaffoldError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| ScaffoldError::Serialize {
            name: path.to_string(),
            source,
        })?;
    let mut contents = String::from_utf8_lossy(&buf).into_owned();
    contents.push('\n');
    Ok(ScaffoldFile {
        path: PathBuf::from(path),
        contents,
    })
}
