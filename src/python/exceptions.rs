//! Python exception types for lcms_parser
//!
//! Maps [`WatersError`] variants to Python exceptions. The two license failures are
//! separate classes so callers can tell a missing key from a refused one.

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyIndexError, PyKeyError, PyValueError};
use pyo3::prelude::*;

use crate::waters::WatersError;

create_exception!(lcms_parser, LcmsParserException, PyException, "Base exception for all lcms_parser errors.");
create_exception!(lcms_parser, LicenseUnresolvedError, LcmsParserException, "No license key given and no license.key file found.");
create_exception!(lcms_parser, LicenseRejectedError, LcmsParserException, "The MassLynx SDK rejected the license key.");
create_exception!(lcms_parser, InvalidRawPathError, LcmsParserException, "The path is not a Waters .raw directory.");
create_exception!(lcms_parser, MassLynxSdkError, LcmsParserException, "The MassLynx SDK is unavailable or a call failed.");

/// Convert WatersError to Python exception
impl From<WatersError> for PyErr {
    fn from(err: WatersError) -> Self {
        match &err {
            WatersError::LicenseUnresolved(_) => LicenseUnresolvedError::new_err(err.to_string()),
            WatersError::LicenseRejected(_) => LicenseRejectedError::new_err(err.to_string()),
            WatersError::InvalidPath { .. } => InvalidRawPathError::new_err(err.to_string()),
            WatersError::SdkUnavailable(_) | WatersError::Sdk(_) => {
                MassLynxSdkError::new_err(err.to_string())
            }
            WatersError::TraceNotFound(_) | WatersError::ChannelNotFound(_) => {
                PyKeyError::new_err(err.to_string())
            }
            WatersError::PeakNotFound { .. } => PyIndexError::new_err(err.to_string()),
            WatersError::InvalidRetentionTime(_) => PyValueError::new_err(err.to_string()),
            WatersError::SpectrumShapeMismatch { .. } => LcmsParserException::new_err(err.to_string()),
        }
    }
}

/// Helper trait for converting Results to PyResult
pub trait IntoPyResult<T> {
    fn into_py_result(self) -> PyResult<T>;
}

impl<T, E: Into<PyErr>> IntoPyResult<T> for Result<T, E> {
    fn into_py_result(self) -> PyResult<T> {
        self.map_err(Into::into)
    }
}
