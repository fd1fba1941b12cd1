//! TOML configuration.
//!
//! ```toml
//! [reconstruction]
//! epsilon_factor = 1e-7
//! degenerate_volume_ratio = 1e-12
//! close_cornerless_loops = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use geobrep_reconstruct::ReconstructionParams;
use serde::{Deserialize, Serialize};

/// Contents of a configuration file. Missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reconstruction: ReconstructionParams,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Invalid configuration")?;
        config
            .reconstruction
            .validate()
            .context("Invalid reconstruction parameters")?;
        Ok(config)
    }

    /// Read `path`, or use the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }
}
