//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can be kept in a file:
//!
//! ```toml
//! # lcms-parser.toml
//! [license]
//! dir = "/opt/masslynx"
//!
//! [peaks]
//! solvent_front = 0.5
//! run_end = 4.5
//! rel_height = 0.9
//! min_prominence = 0.01
//! ```
//!
//! Command line flags override values from the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use lcms_parser::traces::PeakPickingParams;

/// Root configuration structure for lcms-parser.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// License key settings.
    #[serde(default)]
    pub license: LicenseConfig,

    /// Default peak picking parameters.
    #[serde(default)]
    pub peaks: PeakPickingParams,
}

/// Where to find the MassLynx license key.
#[derive(Debug, Default, Deserialize)]
pub struct LicenseConfig {
    /// The key itself.
    pub key: Option<String>,

    /// Directory containing license.key.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
