//! Config loading: JSON5 file, environment overlay, validation.
//!
//! Precedence (low -> high): hardcoded defaults, config file, environment.
//! Explicit per-call arguments are applied later by the callers through
//! [`crate::resolve_setting`].

pub mod env;
mod layer_io;

#[cfg(test)]
mod tests;

use crate::{CairnConfig, ConfigError};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename.
const DEFAULT_CONFIG_FILE: &str = "cairn.json5";
/// Default config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".cairn";

impl CairnConfig {
    /// Load a single config from a path (no environment overlay).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no environment overlay).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        let config: CairnConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the effective config from the process environment.
    ///
    /// The file is `path` when given, else `$CAIRN_CONFIG`, else
    /// `~/.cairn/cairn.json5` when it exists. Environment variables are
    /// applied on top of the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load the effective config using an explicit environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| lookup(env::CAIRN_CONFIG).map(PathBuf::from))
            .or_else(|| layer_io::default_user_config_path().filter(|path| path.exists()));
        let mut config = match path {
            Some(path) => Self::load_from_path(&path)?,
            None => {
                debug!("no config file found; using defaults");
                Self::default()
            }
        };
        config.apply_env_with(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let memory = &self.memory;
        if !(0.0..=1.0).contains(&memory.min_score) {
            return Err(invalid("memory.min_score", "must be between 0 and 1"));
        }
        if memory.dimension == 0 {
            return Err(invalid("memory.dimension", "must be greater than 0"));
        }
        if memory.top_k == 0 {
            return Err(invalid("memory.top_k", "must be greater than 0"));
        }
        if memory.max_context_memories == 0 {
            return Err(invalid(
                "memory.max_context_memories",
                "must be greater than 0",
            ));
        }
        if self.media.max_inline_bytes == 0 {
            return Err(invalid("media.max_inline_bytes", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
