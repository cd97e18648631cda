//! Error types for Waters raw file access.

use std::path::PathBuf;

use thiserror::Error;

use super::sdk::SdkError;
use crate::helpers::IonTraceMode;
use crate::license::LicenseError;

/// Errors that can occur while opening or reading a Waters raw file.
#[derive(Error, Debug)]
pub enum WatersError {
    /// No usable license key: none given and no readable `license.key`, or the key is blank
    #[error("License key unresolved: {0}")]
    LicenseUnresolved(#[from] LicenseError),

    /// Path does not exist or is not a Waters .raw directory
    #[error("Invalid RAW path {}: {reason}", .path.display())]
    InvalidPath {
        /// The path that was given
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// The MassLynx SDK refused the license key
    #[error("License key rejected by the MassLynx SDK: {0}")]
    LicenseRejected(String),

    /// The MassLynx SDK library could not be loaded
    #[error("MassLynx SDK unavailable: {0}")]
    SdkUnavailable(String),

    /// Any other failing SDK call
    #[error("MassLynx SDK error: {0}")]
    Sdk(SdkError),

    /// No MS function reports the requested ion mode
    #[error("No trace for ion mode {0}")]
    TraceNotFound(IonTraceMode),

    /// No analog channel with the requested id
    #[error("No analog channel {0}")]
    ChannelNotFound(usize),

    /// The trace has no peak with the requested index
    #[error("No peak {index} in {mode} trace ({available} peaks)")]
    PeakNotFound {
        /// Ion mode of the trace
        mode: IonTraceMode,
        /// Requested peak index
        index: usize,
        /// Number of peaks in the trace
        available: usize,
    },

    /// A retention time that is NaN or infinite
    #[error("Retention time must be finite, got {0}")]
    InvalidRetentionTime(f64),

    /// Scans averaged into one spectrum have different lengths
    #[error("Cannot average scans of different lengths: scan {scan} has {found} points, expected {expected}")]
    SpectrumShapeMismatch {
        /// Scan number that did not match
        scan: usize,
        /// Length of the first scan read
        expected: usize,
        /// Length of the mismatching scan
        found: usize,
    },
}

impl From<SdkError> for WatersError {
    fn from(error: SdkError) -> Self {
        match error {
            SdkError::LicenseRejected(message) => WatersError::LicenseRejected(message),
            SdkError::Unavailable(message) => WatersError::SdkUnavailable(message),
            other => WatersError::Sdk(other),
        }
    }
}

impl WatersError {
    /// Whether the error is a license problem, either unresolved or rejected
    pub fn is_license_error(&self) -> bool {
        matches!(
            self,
            WatersError::LicenseUnresolved(_) | WatersError::LicenseRejected(_)
        )
    }
}
