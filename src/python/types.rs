//! Python-friendly result types
//!
//! Traces and spectra are handed to Python as snapshots; peaks picked through
//! `WatersRawFile` are stored on the cached Rust trace.

use pyo3::prelude::*;

use crate::msdata::MassSpectrum;
use crate::traces::{AnalogTrace, AnalogTracePeak, TicTrace, TicTracePeak, Trace};

/// A peak found in a TIC or analog trace
#[pyclass(name = "TracePeak")]
#[derive(Clone)]
pub struct PyTracePeak {
    mode: Option<String>,
    time: f64,
    intensity: f64,
    integral: f64,
    relative_height: f64,
    lhs: f64,
    rhs: f64,
}

#[pymethods]
impl PyTracePeak {
    /// Ion mode of the trace, None for analog traces
    #[getter]
    fn mode(&self) -> Option<String> {
        self.mode.clone()
    }

    /// Retention time of the apex in minutes
    #[getter]
    fn time(&self) -> f64 {
        self.time
    }

    /// Intensity at the apex
    #[getter]
    fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Peak integral (area fraction when integrals are scaled)
    #[getter]
    fn integral(&self) -> f64 {
        self.integral
    }

    /// Height at which width and integral were evaluated
    #[getter]
    fn relative_height(&self) -> f64 {
        self.relative_height
    }

    /// Left width boundary in minutes
    #[getter]
    fn lhs(&self) -> f64 {
        self.lhs
    }

    /// Right width boundary in minutes
    #[getter]
    fn rhs(&self) -> f64 {
        self.rhs
    }

    fn __repr__(&self) -> String {
        format!(
            "TracePeak(time={:.3}, intensity={:.4}, integral={:.4}, lhs={:.3}, rhs={:.3})",
            self.time, self.intensity, self.integral, self.lhs, self.rhs
        )
    }
}

impl From<&TicTracePeak> for PyTracePeak {
    fn from(peak: &TicTracePeak) -> Self {
        Self {
            mode: Some(peak.mode.to_string()),
            time: peak.time.as_minutes(),
            intensity: peak.intensity,
            integral: peak.integral,
            relative_height: peak.relative_height,
            lhs: peak.lhs.as_minutes(),
            rhs: peak.rhs.as_minutes(),
        }
    }
}

impl From<&AnalogTracePeak> for PyTracePeak {
    fn from(peak: &AnalogTracePeak) -> Self {
        Self {
            mode: None,
            time: peak.time.as_minutes(),
            intensity: peak.intensity,
            integral: peak.integral,
            relative_height: peak.relative_height,
            lhs: peak.lhs.as_minutes(),
            rhs: peak.rhs.as_minutes(),
        }
    }
}

/// Total ion current trace of one ion mode
#[pyclass(name = "TicTrace")]
#[derive(Clone)]
pub struct PyTicTrace {
    inner: TicTrace,
}

#[pymethods]
impl PyTicTrace {
    /// Ion mode string, e.g. "ES+"
    #[getter]
    fn mode(&self) -> String {
        self.inner.mode.to_string()
    }

    /// Retention times in minutes
    #[getter]
    fn times(&self) -> Vec<f64> {
        self.inner.times.clone()
    }

    /// Total ion current per scan
    #[getter]
    fn intensities(&self) -> Vec<f64> {
        self.inner.intensities.clone()
    }

    /// Peaks picked so far
    #[getter]
    fn peaks(&self) -> Vec<PyTracePeak> {
        self.inner.peaks.iter().map(PyTracePeak::from).collect()
    }

    /// Index of the scan closest to `time` (minutes)
    fn get_scan_index(&self, time: f64) -> Option<usize> {
        self.inner.scan_index(time.into())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "TicTrace(mode='{}', points={}, peaks={})",
            self.inner.mode,
            self.inner.len(),
            self.inner.peaks.len()
        )
    }
}

impl From<TicTrace> for PyTicTrace {
    fn from(trace: TicTrace) -> Self {
        Self { inner: trace }
    }
}

/// Analog detector trace (UV, DAD, ...)
#[pyclass(name = "AnalogTrace")]
#[derive(Clone)]
pub struct PyAnalogTrace {
    inner: AnalogTrace,
}

#[pymethods]
impl PyAnalogTrace {
    /// Channel description
    #[getter]
    fn description(&self) -> String {
        self.inner.description.clone()
    }

    /// Retention times in minutes
    #[getter]
    fn times(&self) -> Vec<f64> {
        self.inner.times.clone()
    }

    /// Intensities, scaled to a maximum of 1.0 unless scaling was disabled
    #[getter]
    fn intensities(&self) -> Vec<f64> {
        self.inner.intensities.clone()
    }

    /// Peaks picked so far
    #[getter]
    fn peaks(&self) -> Vec<PyTracePeak> {
        self.inner.peaks.iter().map(PyTracePeak::from).collect()
    }

    /// Index of the point closest to `time` (minutes)
    fn get_scan_index(&self, time: f64) -> Option<usize> {
        self.inner.scan_index(time.into())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalogTrace(description='{}', points={}, peaks={})",
            self.inner.description,
            self.inner.len(),
            self.inner.peaks.len()
        )
    }
}

impl From<AnalogTrace> for PyAnalogTrace {
    fn from(trace: AnalogTrace) -> Self {
        Self { inner: trace }
    }
}

/// A mass spectrum, optionally averaged over neighbouring scans
#[pyclass(name = "MassSpectrum")]
#[derive(Clone)]
pub struct PyMassSpectrum {
    inner: MassSpectrum,
}

#[pymethods]
impl PyMassSpectrum {
    /// Ion mode string of the function
    #[getter]
    fn mode(&self) -> String {
        self.inner.mode.to_string()
    }

    /// m/z values
    #[getter]
    fn masses(&self) -> Vec<f64> {
        self.inner.masses.clone()
    }

    /// Intensities
    #[getter]
    fn intensities(&self) -> Vec<f64> {
        self.inner.intensities.clone()
    }

    /// Base peak as (mass, intensity), None for an empty spectrum
    fn base_peak(&self) -> Option<(f64, f64)> {
        self.inner.base_peak().map(|p| (p.mass, p.intensity))
    }

    /// Sum of all intensities
    fn total_ion_current(&self) -> f64 {
        self.inner.total_ion_current()
    }

    /// Most intense point within `tolerance` of `mass` as (mass, intensity)
    #[pyo3(signature = (mass, tolerance=0.5))]
    fn most_intense_within(&self, mass: f64, tolerance: f64) -> Option<(f64, f64)> {
        self.inner
            .most_intense_within(mass, tolerance)
            .map(|p| (p.mass, p.intensity))
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "MassSpectrum(mode='{}', points={})",
            self.inner.mode,
            self.inner.len()
        )
    }
}

impl From<MassSpectrum> for PyMassSpectrum {
    fn from(spectrum: MassSpectrum) -> Self {
        Self { inner: spectrum }
    }
}
