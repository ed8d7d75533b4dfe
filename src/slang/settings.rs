//! Tool settings for the slang binaries.
//!
//! `defaults/slang.default.toml` is embedded so that the documented defaults and
//! runtime behavior stay in sync. Callers layer user files on top of those
//! defaults via [`Loader`] before deserializing into [`SlangSettings`].
//!
//! These are settings for the tool (which interpreter to spawn, where the REPL
//! keeps history). The keyword tables live in the mapping document, see
//! [`crate::slang::mapping`].

use crate::slang::engine::TranspileOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../../defaults/slang.default.toml");

/// Error type for settings loading
pub type SettingsError = ConfigError;

/// Optional settings file picked up from the working directory
pub const LOCAL_SETTINGS_FILE: &str = "slang.toml";

/// Top-level settings consumed by the slang CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct SlangSettings {
    pub transpile: TranspileSettings,
    pub runner: RunnerSettings,
    pub repl: ReplSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranspileSettings {
    pub literal_aware_patterns: bool,
    pub normalize: bool,
}

impl From<&TranspileSettings> for TranspileOptions {
    fn from(settings: &TranspileSettings) -> Self {
        TranspileOptions {
            literal_aware_patterns: settings.literal_aware_patterns,
            normalize: settings.normalize,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSettings {
    pub python: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplSettings {
    pub history_file: PathBuf,
    pub history_limit: usize,
    pub prompt: String,
    pub continuation_prompt: String,
}

impl ReplSettings {
    /// Where history is persisted; relative paths resolve under the home directory.
    pub fn history_path(&self) -> PathBuf {
        if self.history_file.is_absolute() {
            return self.history_file.clone();
        }
        match dirs::home_dir() {
            Some(home) => home.join(&self.history_file),
            None => self.history_file.clone(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a settings file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional settings file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, SettingsError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting settings.
    pub fn build(self) -> Result<SlangSettings, SettingsError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SlangSettings, SettingsError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_settings() {
        let settings = load_defaults().expect("defaults to deserialize");
        assert!(settings.transpile.literal_aware_patterns);
        assert!(settings.transpile.normalize);
        assert_eq!(settings.runner.python, "python3");
        assert_eq!(settings.repl.prompt, ">>> ");
        assert_eq!(settings.repl.history_limit, 1000);
    }

    #[test]
    fn supports_overrides() {
        let settings = Loader::new()
            .set_override("runner.python", "python3.12")
            .expect("override to apply")
            .set_override("transpile.normalize", false)
            .expect("override to apply")
            .build()
            .expect("settings to build");
        assert_eq!(settings.runner.python, "python3.12");
        assert!(!TranspileOptions::from(&settings.transpile).normalize);
    }

    #[test]
    fn layers_a_settings_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[repl]\nprompt = \"fr> \"").unwrap();
        let settings = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(settings.repl.prompt, "fr> ");
        assert_eq!(settings.repl.continuation_prompt, "... ");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let settings = Loader::new()
            .with_optional_file("/definitely/not/here/slang.toml")
            .build()
            .unwrap();
        assert_eq!(settings.runner.python, "python3");
    }

    #[test]
    fn absolute_history_path_is_kept() {
        let mut settings = load_defaults().unwrap().repl;
        settings.history_file = PathBuf::from("/tmp/slang_history");
        assert_eq!(settings.history_path(), PathBuf::from("/tmp/slang_history"));
    }
}
