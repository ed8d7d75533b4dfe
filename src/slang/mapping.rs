//! Mapping loader
//!
//! Reads the configuration document that drives the transpiler and turns it into
//! a [`MappingDocument`]: the keyword table, the special-pattern table and the
//! optional language metadata used by the editor scaffold.
//!
//! Two document shapes are accepted:
//!
//! ```text
//! structured:  {"keywords": {...}, "special_patterns": {...}, "language_info": {...}}
//! legacy:      {"rizz": "return", "cap": "False", ...}
//! ```
//!
//! A top-level mapping with a `keywords` key is structured. Anything else that is
//! a mapping is the legacy shape: the whole document is the keyword table and
//! there are no special patterns. Legacy documents still load, with a
//! deprecation warning on the diagnostic stream.
//!
//! Documents are JSON unless the file extension is `.yaml` or `.yml`. Table
//! order is the document order.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to build tables from a configuration document. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read mapping file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mapping document is not valid {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
    #[error("invalid mapping document: {0}")]
    InvalidShape(String),
    #[error("pattern {pattern:?} does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Which of the two accepted document shapes was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    Structured,
    Legacy,
}

/// Metadata for editor integrations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LanguageInfo {
    pub name: String,
    pub file_extension: String,
    pub description: String,
}

impl Default for LanguageInfo {
    fn default() -> Self {
        Self {
            name: "CustomLanguage".to_string(),
            file_extension: ".custom".to_string(),
            description: "A custom programming language".to_string(),
        }
    }
}

/// Ordered custom → canonical keyword pairs with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, String)>,
}

impl KeywordTable {
    /// Build a table from ordered pairs.
    ///
    /// A repeated key keeps its first position and takes the latest value, which
    /// matches how a JSON object with duplicate keys is read.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (key, value) in pairs {
            let (key, value) = (key.into(), value.into());
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self { entries }
    }

    /// The canonical → custom table.
    ///
    /// When several custom keywords map to the same canonical token, the first
    /// one registered claims it; the rest only work in the forward direction.
    pub fn reversed(&self) -> KeywordTable {
        let mut entries: Vec<(String, String)> = Vec::with_capacity(self.entries.len());
        for (custom, canonical) in &self.entries {
            match entries.iter().find(|(k, _)| k == canonical) {
                Some((_, claimed)) => {
                    tracing::debug!(
                        canonical = canonical.as_str(),
                        kept = claimed.as_str(),
                        shadowed = custom.as_str(),
                        "reverse mapping collision"
                    );
                }
                None => entries.push((canonical.clone(), custom.clone())),
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries ordered by descending key length, ties in table order.
    ///
    /// Longer keywords must be tried first so that `no_cap` is never pre-empted
    /// by `cap`.
    pub fn sorted_by_length(&self) -> Vec<(&str, &str)> {
        let mut sorted: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        sorted.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A loaded configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDocument {
    pub shape: DocumentShape,
    pub keywords: KeywordTable,
    /// (regex source, replacement template) in document order
    pub special_patterns: Vec<(String, String)>,
    pub language_info: LanguageInfo,
}

impl MappingDocument {
    /// Read and parse a mapping file, choosing JSON or YAML by extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml_str(&source)
        } else {
            Self::from_json_str(&source)
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_json::from_str(source).map_err(|e| ConfigurationError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_yaml::from_str(source).map_err(|e| ConfigurationError::Parse {
                format: "YAML",
                message: e.to_string(),
            })?;
        Self::from_value(value)
    }

    /// Classify the document shape and extract the tables
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        let Value::Object(mut root) = value else {
            return Err(ConfigurationError::InvalidShape(
                "top-level value must be a mapping".to_string(),
            ));
        };

        if !root.contains_key("keywords") {
            tracing::warn!(
                "mapping document has no \"keywords\" section; the legacy flat format is \
                 deprecated, move the entries under \"keywords\""
            );
            return Ok(Self {
                shape: DocumentShape::Legacy,
                keywords: KeywordTable::new(string_pairs(&root, "document")?),
                special_patterns: Vec::new(),
                language_info: LanguageInfo::default(),
            });
        }

        let keywords = match root.remove("keywords") {
            Some(Value::Object(map)) => KeywordTable::new(string_pairs(&map, "keywords")?),
            _ => {
                return Err(ConfigurationError::InvalidShape(
                    "\"keywords\" must be a mapping".to_string(),
                ))
            }
        };

        let special_patterns = match root.remove("special_patterns") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => string_pairs(&map, "special_patterns")?,
            Some(_) => {
                return Err(ConfigurationError::InvalidShape(
                    "\"special_patterns\" must be a mapping".to_string(),
                ))
            }
        };

        let language_info = match root.remove("language_info") {
            None | Some(Value::Null) => LanguageInfo::default(),
            Some(info) => serde_json::from_value(info).map_err(|e| {
                ConfigurationError::InvalidShape(format!("\"language_info\": {}", e))
            })?,
        };

        Ok(Self {
            shape: DocumentShape::Structured,
            keywords,
            special_patterns,
            language_info,
        })
    }
}

fn string_pairs(
    map: &Map<String, Value>,
    section: &str,
) -> Result<Vec<(String, String)>, ConfigurationError> {
    map.iter()
        .map(|(key, value)| match scalar_text(value) {
            Some(text) => Ok((key.clone(), text)),
            None => Err(ConfigurationError::InvalidShape(format!(
                "{}.{} must be a string, found {}",
                section, key, value
            ))),
        })
        .collect()
}

/// Text of a scalar value. Unquoted YAML scalars like `True` or `None` arrive as
/// bools and nulls, so they are spelled back the way Python writes them.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Null => Some("None".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
