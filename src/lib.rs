//! # lcms-parser - A Toolkit for Waters UPLC-MS Raw Files
//!
//! `lcms-parser` reads Waters MassLynx `.raw` acquisition directories. Decoding of the
//! proprietary container is performed by the vendor's MassLynx SDK; this crate wraps the
//! SDK reader calls in a typed facade and adds the chromatographic processing that sits on
//! top of them.
//!
//! ## Key Features
//!
//! - **License Resolution**: An explicit license key always wins; otherwise a
//!   `license.key` file in the working directory is used. "No key" and "key rejected"
//!   are distinct errors.
//!
//! - **Trace Access**: Total ion current traces per ionisation mode and analog
//!   (UV/DAD) channels, cached on the handle after the first read.
//!
//! - **Peak Picking**: Local-maximum detection, prominence, width at relative height
//!   and trapezoidal integration over the useful part of a run.
//!
//! - **Mass Spectra**: Scan extraction at a retention time or trace peak with optional
//!   averaging of neighbouring scans.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "masslynx")]
//! # fn main() -> Result<(), lcms_parser::waters::WatersError> {
//! use lcms_parser::prelude::*;
//!
//! // Falls back to ./license.key when no key is given
//! let mut raw = WatersRawFile::open("sample.raw", None)?;
//!
//! let mode: IonTraceMode = "ES+".parse().unwrap();
//! let trace = raw.get_trace(&mode)?;
//! println!("{} TIC points", trace.times.len());
//!
//! let spectrum = raw.get_peak_mass_spectrum(&mode, 0, 2)?;
//! if let Some(bp) = spectrum.base_peak() {
//!     println!("Base peak m/z {:.4}", bp.mass);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "masslynx"))]
//! # fn main() {}
//! ```
//!
//! ## Architecture
//!
//! - [`license`]: License key type and `license.key` fallback resolution
//! - [`waters`]: The raw file facade, the SDK seam and the native SDK binding
//! - [`traces`]: TIC and analog traces with peak picking
//! - [`msdata`]: Mass spectra and mass peaks
//! - [`signal`]: 1-D peak detection primitives
//! - [`helpers`]: Ion trace modes, retention times and normalisation

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod helpers;
pub mod license;
pub mod msdata;
pub mod signal;
pub mod traces;
pub mod waters;

// Python bindings module (only compiled with the "python" feature)
#[cfg(feature = "python")]
mod python;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::helpers::{normalised, IonTraceMode, RetentionTime};
    pub use crate::license::{LicenseKey, LicenseResolver, LicenseSource, ResolvedLicense};
    pub use crate::msdata::{MassPeak, MassSpectrum};
    pub use crate::traces::{
        AnalogTrace, AnalogTracePeak, PeakPickingParams, TicTrace, TicTracePeak, Trace,
    };
    pub use crate::waters::{MassLynxReader, MassLynxSdk, OpenOptions, WatersError, WatersRawFile};
}

pub use license::LicenseKey;
pub use waters::{WatersError, WatersRawFile};
