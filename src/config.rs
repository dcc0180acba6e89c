//! Run configuration.
//!
//! A run is described by a base path, the source sub-paths to scan below
//! it, glob patterns for files to leave out, and the extensions that mark
//! a source file.  The same settings can come from a TOML file:
//!
//! ```toml
//! base_path = "/srv/app"
//! sources = ["src", "lib"]
//! ignore = ["**/tests/**", "**/*Test.php"]
//! extensions = ["php"]
//! ```

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_path: PathBuf,
    /// Sub-paths of `base_path` to scan, in order.  Empty means the base
    /// path itself.
    pub sources: Vec<PathBuf>,
    /// Glob patterns matched against each candidate's absolute path.
    pub ignore: Vec<String>,
    /// File extensions (without the dot) that mark a source file.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_path: PathBuf::from("."),
            sources: Vec::new(),
            ignore: Vec::new(),
            extensions: vec!["php".to_string()],
        }
    }
}

impl Config {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Config {
            base_path: base_path.into(),
            ..Config::default()
        }
    }

    /// Read a TOML config file.  A relative `base_path` inside the file is
    /// taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if config.base_path.is_relative()
            && let Some(dir) = path.parent()
        {
            config.base_path = dir.join(&config.base_path);
        }
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The directories (or files) to walk, in order.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        if self.sources.is_empty() {
            return vec![self.base_path.clone()];
        }
        self.sources.iter().map(|s| self.base_path.join(s)).collect()
    }

    /// Compile the ignore globs.
    pub fn ignore_patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.ignore
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ConfigError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}
