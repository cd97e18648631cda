//! # MassLynx License Keys
//!
//! The MassLynx SDK refuses to decode raw data without a vendor-issued license key.
//! A key is resolved in this order:
//!
//! 1. A key passed explicitly by the caller
//! 2. The contents of a `license.key` file in the search directory (by default the
//!    current working directory)
//!
//! An explicit key always wins, even when a `license.key` file with a different key is
//! present. An explicit key that is blank is an error and does not fall back to the file.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

/// Name of the fallback license file looked up in the search directory.
pub const LICENSE_FILE_NAME: &str = "license.key";

// Editors on Windows prefix UTF-8 text files with U+FEFF, which `str::trim` keeps.
const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Errors that can occur while resolving a license key
#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    /// No key was given and no license file exists
    #[error("No license key provided and no license file found at {}", .path.display())]
    NotFound {
        /// The license file location that was checked
        path: PathBuf,
    },

    /// The license file exists but could not be read
    #[error("Unable to read license file {}: {source}", .path.display())]
    Unreadable {
        /// The license file location
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The key is empty once surrounding whitespace is removed
    #[error("License key from {origin} is empty")]
    Empty {
        /// Where the empty key came from
        origin: LicenseSource,
    },
}

/// Where a license key was obtained from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseSource {
    /// Passed in by the caller
    Explicit,
    /// Read from a license file
    File(PathBuf),
}

impl fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseSource::Explicit => write!(f, "explicit argument"),
            LicenseSource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// A non-empty MassLynx license key.
///
/// The `Debug` representation never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Create a key, stripping surrounding whitespace and a leading byte order mark.
    /// Blank keys are rejected.
    pub fn new(key: impl AsRef<str>, origin: LicenseSource) -> Result<Self, LicenseError> {
        let key = key.as_ref().trim_start_matches(BYTE_ORDER_MARK).trim();
        if key.is_empty() {
            return Err(LicenseError::Empty { origin });
        }
        Ok(Self(key.to_string()))
    }

    /// The key as passed to the SDK
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LicenseKey(<{} chars>)", self.0.chars().count())
    }
}

/// A license key together with where it came from
#[derive(Debug, Clone)]
pub struct ResolvedLicense {
    /// The resolved key
    pub key: LicenseKey,
    /// Origin of the key
    pub source: LicenseSource,
}

/// Resolves a license key from an explicit value or a `license.key` file.
#[derive(Debug, Clone)]
pub struct LicenseResolver {
    search_dir: Option<PathBuf>,
}

impl LicenseResolver {
    /// Look for `license.key` in the process working directory at resolution time.
    pub fn from_current_dir() -> Self {
        Self { search_dir: None }
    }

    /// Look for `license.key` in `dir`.
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            search_dir: Some(dir.into()),
        }
    }

    /// Path of the fallback license file this resolver reads.
    pub fn license_file(&self) -> Result<PathBuf, LicenseError> {
        let dir = match &self.search_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|source| LicenseError::Unreadable {
                path: PathBuf::from(LICENSE_FILE_NAME),
                source,
            })?,
        };
        Ok(dir.join(LICENSE_FILE_NAME))
    }

    /// Resolve the key: `explicit` when given, otherwise the license file.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<ResolvedLicense, LicenseError> {
        if let Some(key) = explicit {
            debug!("Using explicitly provided license key");
            return Ok(ResolvedLicense {
                key: LicenseKey::new(key, LicenseSource::Explicit)?,
                source: LicenseSource::Explicit,
            });
        }

        let path = self.license_file()?;
        let source = LicenseSource::File(path.clone());
        let content = read_license_file(&path)?;
        debug!("Read license key from {}", path.display());
        Ok(ResolvedLicense {
            key: LicenseKey::new(content, source.clone())?,
            source,
        })
    }
}

impl Default for LicenseResolver {
    fn default() -> Self {
        Self::from_current_dir()
    }
}

fn read_license_file(path: &Path) -> Result<String, LicenseError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LicenseError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LicenseError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
