//! Configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use larch_motion::AnimationConfig;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "larch.toml";

/// Contents of `larch.toml`.
///
/// ```toml
/// [animation]
/// words_per_minute = 800
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LarchConfig {
    pub animation: AnimationConfig,
}

impl LarchConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Load `path`, or `./larch.toml` if present, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In config file {}", path.display()))
    }
}
