use serde::{Deserialize, Serialize};

use super::{pick_peaks, PeakPickingParams, Trace};
use crate::helpers::{IonTraceMode, RetentionTime};

/// A peak in a [`TicTrace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicTracePeak {
    /// Ionisation mode of the trace the peak was found in
    pub mode: IonTraceMode,
    /// Retention time of the apex
    pub time: RetentionTime,
    /// Total ion current at the apex
    pub intensity: f64,
    /// Integral of the peak, relative to all peaks found in the same pass unless
    /// integral scaling was disabled
    pub integral: f64,
    /// Height at which the width and integral were evaluated
    pub relative_height: f64,
    /// Retention time of the left width boundary
    pub lhs: RetentionTime,
    /// Retention time of the right width boundary
    pub rhs: RetentionTime,
}

/// Total ion current trace of one MS function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicTrace {
    /// Ionisation mode of the function
    pub mode: IonTraceMode,
    /// Retention times in minutes, one per scan
    pub times: Vec<f64>,
    /// Total ion current per scan
    pub intensities: Vec<f64>,
    /// Peaks found so far
    pub peaks: Vec<TicTracePeak>,
}

impl TicTrace {
    /// Create a trace for `mode`
    pub fn new(mode: IonTraceMode, times: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            mode,
            times,
            intensities,
            peaks: Vec::new(),
        }
    }

    /// Find peaks between the solvent front and the end of the run.
    ///
    /// The found peaks are appended to [`TicTrace::peaks`] and returned.
    pub fn get_peaks(&mut self, params: &PeakPickingParams) -> Vec<TicTracePeak> {
        let peaks: Vec<TicTracePeak> = pick_peaks(&self.times, &self.intensities, params)
            .into_iter()
            .map(|p| TicTracePeak {
                mode: self.mode.clone(),
                time: p.time,
                intensity: p.intensity,
                integral: p.integral,
                relative_height: p.relative_height,
                lhs: p.lhs,
                rhs: p.rhs,
            })
            .collect();
        self.peaks.extend(peaks.iter().cloned());
        peaks
    }

    /// Total ion current summed over the whole trace
    pub fn total(&self) -> f64 {
        self.intensities.iter().sum()
    }
}

impl Trace for TicTrace {
    fn times(&self) -> &[f64] {
        &self.times
    }

    fn intensities(&self) -> &[f64] {
        &self.intensities
    }
}
