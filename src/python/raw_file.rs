//! Python bindings for WatersRawFile

use std::collections::BTreeMap;

use pyo3::prelude::*;

use crate::helpers::IonTraceMode;
use crate::python::exceptions::IntoPyResult;
use crate::python::types::{PyAnalogTrace, PyMassSpectrum, PyTicTrace, PyTracePeak};
use crate::signal::FindPeaksParams;
use crate::traces::PeakPickingParams;
use crate::waters::{OpenOptions, WatersRawFile};

/// A Waters .raw directory opened through the MassLynx SDK
///
/// The license key is `license_key` when given, otherwise the contents of
/// `license.key` in the current working directory.
///
/// Example:
///     >>> raw = lcms_parser.WatersRawFile("sample.raw", license_key="XXXXXX")
///     >>> trace = raw.get_trace("ES+")
///     >>> peaks = raw.get_trace_peaks("ES+")
///     >>> spectrum = raw.get_peak_mass_spectrum("ES+", 0, average=2)
#[pyclass(name = "WatersRawFile", unsendable)]
pub struct PyWatersRawFile {
    inner: WatersRawFile,
}

fn peak_params(
    solvent_front: f64,
    run_end: f64,
    rel_height: f64,
    scale_integrals: bool,
) -> PeakPickingParams {
    PeakPickingParams {
        solvent_front,
        run_end,
        rel_height,
        scale_integrals,
        detection: FindPeaksParams::default(),
    }
}

#[pymethods]
impl PyWatersRawFile {
    /// Open a raw directory
    ///
    /// Args:
    ///     path: Path to the .raw directory
    ///     license_key: MassLynx license key (default: read ./license.key)
    ///     scale_analog: Scale analog traces to a maximum of 1.0
    ///
    /// Raises:
    ///     LicenseUnresolvedError: no key given and no license.key found
    ///     InvalidRawPathError: path is not a .raw directory
    ///     LicenseRejectedError: the SDK refused the key
    #[new]
    #[pyo3(signature = (path, license_key=None, scale_analog=true))]
    fn new(path: String, license_key: Option<String>, scale_analog: bool) -> PyResult<Self> {
        let mut options = OpenOptions::new().scale_analog(scale_analog);
        if let Some(key) = license_key {
            options = options.license_key(key);
        }
        let inner = options.open(&path).into_py_result()?;
        Ok(Self { inner })
    }

    /// Path of the raw directory
    #[getter]
    fn path(&self) -> String {
        self.inner.path().display().to_string()
    }

    /// Where the license key came from
    #[getter]
    fn license_source(&self) -> String {
        self.inner.license_source().to_string()
    }

    /// Function number per ion mode string
    fn get_chromatogram_ids(&self) -> BTreeMap<String, usize> {
        self.inner
            .get_chromatogram_ids()
            .iter()
            .map(|(mode, function)| (mode.to_string(), *function))
            .collect()
    }

    /// Analog channels as (channel_id, description) tuples
    fn get_analog_ids(&self) -> PyResult<Vec<(usize, String)>> {
        self.inner.get_analog_ids().into_py_result()
    }

    /// Number of scans recorded for an ion mode
    fn scan_count(&self, mode: &str) -> PyResult<usize> {
        self.inner.scan_count(&IonTraceMode::from(mode)).into_py_result()
    }

    /// TIC trace of an ion mode, e.g. "ES+"
    fn get_trace(&mut self, mode: &str) -> PyResult<PyTicTrace> {
        let trace = self.inner.get_trace(&IonTraceMode::from(mode)).into_py_result()?;
        Ok(PyTicTrace::from(trace.clone()))
    }

    /// Analog trace of a channel
    fn get_analog_trace(&mut self, channel_id: usize) -> PyResult<PyAnalogTrace> {
        let trace = self.inner.get_analog_trace(channel_id).into_py_result()?;
        Ok(PyAnalogTrace::from(trace.clone()))
    }

    /// Pick peaks on the TIC trace of an ion mode
    ///
    /// The peaks are also stored on the cached trace.
    #[pyo3(signature = (mode, solvent_front=0.4, run_end=3.0, rel_height=0.95, scale_integrals=true))]
    fn get_trace_peaks(
        &mut self,
        mode: &str,
        solvent_front: f64,
        run_end: f64,
        rel_height: f64,
        scale_integrals: bool,
    ) -> PyResult<Vec<PyTracePeak>> {
        let params = peak_params(solvent_front, run_end, rel_height, scale_integrals);
        let trace = self.inner.get_trace(&IonTraceMode::from(mode)).into_py_result()?;
        Ok(trace.get_peaks(&params).iter().map(PyTracePeak::from).collect())
    }

    /// Pick peaks on an analog trace
    ///
    /// The peaks are also stored on the cached trace.
    #[pyo3(signature = (channel_id, solvent_front=0.4, run_end=3.0, rel_height=0.95, scale_integrals=true))]
    fn get_analog_peaks(
        &mut self,
        channel_id: usize,
        solvent_front: f64,
        run_end: f64,
        rel_height: f64,
        scale_integrals: bool,
    ) -> PyResult<Vec<PyTracePeak>> {
        let params = peak_params(solvent_front, run_end, rel_height, scale_integrals);
        let trace = self.inner.get_analog_trace(channel_id).into_py_result()?;
        Ok(trace.get_peaks(&params).iter().map(PyTracePeak::from).collect())
    }

    /// Mass spectrum at a retention time (minutes)
    ///
    /// Args:
    ///     time: Retention time in minutes
    ///     mode: Ion mode string
    ///     average: Number of neighbouring scans on each side to average
    #[pyo3(signature = (time, mode, average=0))]
    fn get_mass_spectrum(&mut self, time: f64, mode: &str, average: usize) -> PyResult<PyMassSpectrum> {
        self.inner
            .get_mass_spectrum(time, &IonTraceMode::from(mode), average)
            .into_py_result()
            .map(PyMassSpectrum::from)
    }

    /// Mass spectrum at the apex of a TIC peak
    #[pyo3(signature = (mode, peak_idx=0, average=0))]
    fn get_peak_mass_spectrum(
        &mut self,
        mode: &str,
        peak_idx: usize,
        average: usize,
    ) -> PyResult<PyMassSpectrum> {
        self.inner
            .get_peak_mass_spectrum(&IonTraceMode::from(mode), peak_idx, average)
            .into_py_result()
            .map(PyMassSpectrum::from)
    }

    fn __repr__(&self) -> String {
        format!("WatersRawFile(path='{}')", self.inner.path().display())
    }
}
