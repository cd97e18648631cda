//! The seam between the raw file facade and the MassLynx SDK.
//!
//! The SDK is split into four readers (info, analog, chromatogram, scan) that are all
//! created from the same raw directory. [`MassLynxReader`] groups the calls this crate
//! needs from them; [`MassLynxSdk`] creates a reader for a path and license key.

use std::path::Path;

use thiserror::Error;

use crate::license::LicenseKey;

/// Paired `(x, y)` arrays returned by the SDK read calls: times and intensities for
/// chromatograms, masses and intensities for scans.
pub type SdkArrays = (Vec<f32>, Vec<f32>);

/// Errors reported by an SDK implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    /// The SDK did not accept the license key
    #[error("license rejected: {0}")]
    LicenseRejected(String),

    /// The SDK library or one of its entry points could not be loaded
    #[error("{0}")]
    Unavailable(String),

    /// An SDK call returned a non-zero status
    #[error("{call} failed with code {code}: {message}")]
    Call {
        /// Name of the SDK entry point
        call: &'static str,
        /// Status code returned by the SDK
        code: i32,
        /// Message the SDK reports for the code
        message: String,
    },
}

/// Opens readers for raw directories.
pub trait MassLynxSdk {
    /// Register `key` and open the readers for the raw directory at `path`.
    ///
    /// Implementations report a refused key as [`SdkError::LicenseRejected`].
    fn open(&self, path: &Path, key: &LicenseKey) -> Result<Box<dyn MassLynxReader>, SdkError>;
}

/// The SDK reader calls for one open raw directory.
///
/// Function, scan and channel numbers are zero-based.
pub trait MassLynxReader {
    /// Number of acquisition functions
    fn function_count(&self) -> Result<usize, SdkError>;

    /// Numeric ion mode of `function`
    fn ion_mode(&self, function: usize) -> Result<i32, SdkError>;

    /// SDK string for a numeric ion mode, e.g. `ES+`
    fn ion_mode_string(&self, code: i32) -> Result<String, SdkError>;

    /// Number of scans in `function`
    fn scan_count(&self, function: usize) -> Result<usize, SdkError>;

    /// Number of analog channels
    fn analog_channel_count(&self) -> Result<usize, SdkError>;

    /// Description of an analog channel as stored by the instrument
    fn analog_channel_description(&self, channel: usize) -> Result<String, SdkError>;

    /// Times (minutes) and intensities of an analog channel
    fn read_analog_channel(&self, channel: usize) -> Result<SdkArrays, SdkError>;

    /// Times (minutes) and total ion current of `function`
    fn read_tic(&self, function: usize) -> Result<SdkArrays, SdkError>;

    /// Masses and intensities of one scan
    fn read_scan(&self, function: usize, scan: usize) -> Result<SdkArrays, SdkError>;

    /// Ion mode string of `function`
    fn function_ion_mode(&self, function: usize) -> Result<String, SdkError> {
        let code = self.ion_mode(function)?;
        self.ion_mode_string(code)
    }
}

/// Widen SDK `f32` arrays to the `f64` used throughout the crate.
pub(crate) fn widen(values: Vec<f32>) -> Vec<f64> {
    values.into_iter().map(f64::from).collect()
}
