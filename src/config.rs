//! Configuration loading
//!
//! A repository describes its commit formats in `commits-format.json` or
//! `commits-format.toml` at its root. Both files hold the same document, see
//! [`CommitFormatConfiguration`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::schema::CommitFormatConfiguration;

pub const JSON_FILE_NAME: &str = "commits-format.json";
pub const TOML_FILE_NAME: &str = "commits-format.toml";

/// Format used when none is requested
pub const DEFAULT_FORMAT: &str = "default";

/// Errors that can occur when locating or parsing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to parse configuration TOML: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("No commits-format.json or commits-format.toml found in {}", .0.display())]
    NotFound(PathBuf),
    #[error("Found both {} and {}, keep only one", .0.display(), .1.display())]
    Ambiguous(PathBuf, PathBuf),
}

impl CommitFormatConfiguration {
    /// Load a configuration file, choosing the parser by extension
    ///
    /// `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Locate the configuration file in `dir`
pub fn discover(dir: &Path) -> Result<PathBuf, ConfigError> {
    let json = dir.join(JSON_FILE_NAME);
    let toml = dir.join(TOML_FILE_NAME);
    match (json.is_file(), toml.is_file()) {
        (true, false) => Ok(json),
        (false, true) => Ok(toml),
        (true, true) => Err(ConfigError::Ambiguous(json, toml)),
        (false, false) => Err(ConfigError::NotFound(dir.to_path_buf())),
    }
}

/// Options for a single formatting run
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Name of the format to resolve
    pub format: String,
    /// Explicit configuration file; discovered in the working directory when unset
    pub config_path: Option<PathBuf>,
    /// Debug mode: verbose resolution logging
    pub debug: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            config_path: None,
            debug: false,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Path of the configuration this run uses
    ///
    /// Relative discovery happens in `working_dir`.
    pub fn resolve_config_path(&self, working_dir: &Path) -> Result<PathBuf, ConfigError> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => discover(working_dir),
        }
    }

    /// Locate and parse the configuration
    pub fn load(&self, working_dir: &Path) -> Result<CommitFormatConfiguration, ConfigError> {
        let path = self.resolve_config_path(working_dir)?;
        tracing::debug!(path = %path.display(), "Loading configuration");
        CommitFormatConfiguration::from_file(&path)
    }
}
