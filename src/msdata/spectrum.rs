use serde::{Deserialize, Serialize};

use super::MassPeak;
use crate::helpers::{normalised, IonTraceMode};
use crate::signal::{find_peaks, FindPeaksParams};

/// A mass spectrum of one MS function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassSpectrum {
    /// Ionisation mode of the function the scans were read from
    pub mode: IonTraceMode,
    /// m/z values
    pub masses: Vec<f64>,
    /// Intensities, parallel to `masses`
    pub intensities: Vec<f64>,
}

impl MassSpectrum {
    /// Create a spectrum
    pub fn new(mode: IonTraceMode, masses: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            mode,
            masses,
            intensities,
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.masses.len().min(self.intensities.len())
    }

    /// Whether the spectrum has no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the points as peaks
    pub fn iter(&self) -> impl Iterator<Item = MassPeak> + '_ {
        self.masses
            .iter()
            .zip(self.intensities.iter())
            .map(|(&mass, &intensity)| MassPeak::new(mass, intensity))
    }

    /// The most intense point; the first one wins on ties.
    pub fn base_peak(&self) -> Option<MassPeak> {
        Self::most_intense(self.iter())
    }

    /// Sum of all intensities
    pub fn total_ion_current(&self) -> f64 {
        self.intensities.iter().sum()
    }

    /// A copy with intensities scaled to a base peak of 1.0
    pub fn normalised(&self) -> MassSpectrum {
        MassSpectrum {
            mode: self.mode.clone(),
            masses: self.masses.clone(),
            intensities: normalised(&self.intensities),
        }
    }

    /// Local maxima of the spectrum, filtered by `params`
    pub fn peaks(&self, params: &FindPeaksParams) -> Vec<MassPeak> {
        let n = self.len();
        find_peaks(&self.intensities[..n], params)
            .into_iter()
            .map(|i| MassPeak::new(self.masses[i], self.intensities[i]))
            .collect()
    }

    /// The most intense point within `tolerance` of `mass`, if any.
    pub fn most_intense_within(&self, mass: f64, tolerance: f64) -> Option<MassPeak> {
        let tolerance = tolerance.abs();
        Self::most_intense(self.iter().filter(|p| (p.mass - mass).abs() <= tolerance))
    }

    fn most_intense(peaks: impl Iterator<Item = MassPeak>) -> Option<MassPeak> {
        peaks.fold(None, |best: Option<MassPeak>, p| match best {
            Some(b) if b.intensity >= p.intensity => Some(b),
            _ if p.intensity.is_nan() => best,
            _ => Some(p),
        })
    }
}
