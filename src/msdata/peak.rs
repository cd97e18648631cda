use serde::{Deserialize, Serialize};

/// A single peak in a mass spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassPeak {
    /// m/z of the peak
    pub mass: f64,
    /// Intensity of the peak
    pub intensity: f64,
}

impl MassPeak {
    /// Create a new peak
    pub fn new(mass: f64, intensity: f64) -> Self {
        Self { mass, intensity }
    }
}
