use serde::{Deserialize, Serialize};

use super::{pick_peaks, PeakPickingParams, Trace};
use crate::helpers::{normalised, RetentionTime};

/// A peak in an [`AnalogTrace`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalogTracePeak {
    /// Retention time of the apex
    pub time: RetentionTime,
    /// Intensity at the apex
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

/// An analog detector trace, e.g. a UV wavelength or DAD channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogTrace {
    /// Channel description as reported by the instrument
    pub description: String,
    /// Retention times in minutes
    pub times: Vec<f64>,
    /// Intensities, scaled to a maximum of 1.0 unless scaling was disabled
    pub intensities: Vec<f64>,
    /// Peaks found so far
    pub peaks: Vec<AnalogTracePeak>,
}

impl AnalogTrace {
    /// Create a trace. With `scale`, absorbance values are scaled to a maximum of 1.0.
    pub fn new(
        times: Vec<f64>,
        intensities: Vec<f64>,
        description: impl Into<String>,
        scale: bool,
    ) -> Self {
        let description = description.into();
        let intensities = if scale {
            if !intensities.iter().any(|v| *v > 0.0) {
                log::warn!("Analog trace '{}' has no positive intensity, not scaling", description);
            }
            normalised(&intensities)
        } else {
            intensities
        };
        Self {
            description,
            times,
            intensities,
            peaks: Vec::new(),
        }
    }

    /// Attach previously found peaks
    pub fn with_peaks(mut self, peaks: Vec<AnalogTracePeak>) -> Self {
        self.peaks = peaks;
        self
    }

    /// Find peaks between the solvent front and the end of the run.
    ///
    /// The found peaks are appended to [`AnalogTrace::peaks`] and returned.
    pub fn get_peaks(&mut self, params: &PeakPickingParams) -> Vec<AnalogTracePeak> {
        let peaks: Vec<AnalogTracePeak> = pick_peaks(&self.times, &self.intensities, params)
            .into_iter()
            .map(|p| AnalogTracePeak {
                time: p.time,
                intensity: p.intensity,
                integral: p.integral,
                relative_height: p.relative_height,
                lhs: p.lhs,
                rhs: p.rhs,
            })
            .collect();
        self.peaks.extend(peaks.iter().copied());
        peaks
    }
}

impl Trace for AnalogTrace {
    fn times(&self) -> &[f64] {
        &self.times
    }

    fn intensities(&self) -> &[f64] {
        &self.intensities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traces::tests::gaussian_run;

    #[test]
    fn test_scaling() {
        let trace = AnalogTrace::new(vec![0.0, 1.0, 2.0], vec![0.5, 2.0, 1.0], "UV 254", true);
        assert_eq!(trace.intensities, vec![0.25, 1.0, 0.5]);

        let raw = AnalogTrace::new(vec![0.0, 1.0, 2.0], vec![0.5, 2.0, 1.0], "UV 254", false);
        assert_eq!(raw.intensities, vec![0.5, 2.0, 1.0]);
    }

    #[test]
    fn test_peaks_accumulate() {
        let (times, intensities) = gaussian_run(&[(1.2, 0.4), (2.1, 0.8)], 0.01, 4.0);
        let mut trace = AnalogTrace::new(times, intensities, "DAD 210-400nm", true);

        let first = trace.get_peaks(&PeakPickingParams::default());
        assert_eq!(first.len(), 2);
        assert!((first[1].intensity - 1.0).abs() < 1e-6);
        assert_eq!(trace.peaks.len(), 2);

        trace.get_peaks(&PeakPickingParams::default());
        assert_eq!(trace.peaks.len(), 4);
    }

    #[test]
    fn test_scan_index() {
        let trace = AnalogTrace::new(vec![0.0, 0.1, 0.2, 0.3], vec![0.0; 4], "UV", false);
        assert_eq!(trace.scan_index(RetentionTime::from(0.18)), Some(2));
        assert_eq!(
            trace.scan_index(chrono::TimeDelta::seconds(6).into()),
            Some(1)
        );
    }
}
