//! Mass spectra extracted from MS functions.
//!
//! A [`MassSpectrum`] is built from one or more scans of a function, averaged
//! element-wise. Masses are kept as reported by the SDK.

mod peak;
mod spectrum;

pub use peak::MassPeak;
pub use spectrum::MassSpectrum;
