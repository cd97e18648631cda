//! Python bindings for lcms_parser
//!
//! Exposes the Waters raw file facade to Python via PyO3. Rust log records are forwarded
//! to Python's `logging` module.
//!
//! # Example
//!
//! ```python
//! import lcms_parser
//!
//! raw = lcms_parser.WatersRawFile("sample.raw")  # key from ./license.key
//! for channel, description in raw.get_analog_ids():
//!     trace = raw.get_analog_trace(channel)
//!     print(description, len(trace))
//! ```

pub(crate) mod exceptions;
mod raw_file;
mod types;

use pyo3::prelude::*;

/// Initialize the lcms_parser Python module
#[pymodule]
fn lcms_parser(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Initialize logging bridge to Python's logging module
    pyo3_log::init();

    // Register exception types
    m.add("LcmsParserException", py.get_type::<exceptions::LcmsParserException>())?;
    m.add("LicenseUnresolvedError", py.get_type::<exceptions::LicenseUnresolvedError>())?;
    m.add("LicenseRejectedError", py.get_type::<exceptions::LicenseRejectedError>())?;
    m.add("InvalidRawPathError", py.get_type::<exceptions::InvalidRawPathError>())?;
    m.add("MassLynxSdkError", py.get_type::<exceptions::MassLynxSdkError>())?;

    // Register data types
    m.add_class::<types::PyTracePeak>()?;
    m.add_class::<types::PyTicTrace>()?;
    m.add_class::<types::PyAnalogTrace>()?;
    m.add_class::<types::PyMassSpectrum>()?;

    m.add_class::<raw_file::PyWatersRawFile>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
