//! Layered configuration for the parser.
//!
//! `defaults/webidl.default.toml` is embedded into the library so that docs and runtime
//! behavior stay in sync. Callers layer their own files on top of those defaults via
//! [`Loader`] before deserializing into [`ParserConfig`].

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/webidl.default.toml");

/// Top-level configuration consumed by [`WebIdlParser`](crate::webidl::parsing::WebIdlParser).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParserConfig {
    pub parsing: ParsingConfig,
    pub model: ModelConfig,
}

/// Knobs for the stream and the grammar engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParsingConfig {
    /// Key of the package marker comment, `// [<package_marker>=name]`.
    pub package_marker: String,
    pub read_chunk_size: usize,
}

/// Knobs for the finalize passes of `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    pub warn_duplicate_arity: bool,
    pub check_inline_supers: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            package_marker: "package".to_string(),
            read_chunk_size: 8192,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            warn_duplicate_arity: true,
            check_inline_supers: true,
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

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML text, e.g. a `[webidl]` table extracted from a larger build file.
    pub fn with_toml_str(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ParserConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ParserConfig, ConfigError> {
    Loader::new().build()
}
