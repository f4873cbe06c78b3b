//! YAML configuration file adapter.
//!
//! Implements [`ConfigPort`] over a file on disk.  Missing keys take their
//! defaults, so a file holding only `target_temperature_c: 57` is valid.
//! The result is always validated before it is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct YamlConfigAdapter {
    path: PathBuf,
}

impl YamlConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse and validate configuration text.
    pub fn parse(text: &str) -> Result<SystemConfig, ConfigError> {
        // An empty document deserializes to unit, not to a map.
        let config: SystemConfig = if text.trim().is_empty() {
            SystemConfig::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }
}

impl ConfigPort for YamlConfigAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(self.path.clone()),
            _ => ConfigError::Io(e),
        })?;
        let config = Self::parse(&text)?;
        info!("config: loaded {}", self.path.display());
        Ok(config)
    }
}
