//! # Waters MassLynx Raw Files
//!
//! Access to Waters `.raw` acquisition directories through the MassLynx SDK.
//!
//! - [`WatersRawFile`]: the facade; resolves the license, validates the directory and
//!   serves cached traces and mass spectra
//! - [`MassLynxSdk`] / [`MassLynxReader`]: the calls the facade needs from the SDK
//! - `native` (feature `masslynx`): the SDK loaded from the vendor shared library
//! - [`check`]: a step-by-step diagnostic report for a raw directory
//!
//! ## Example
//!
//! Any [`MassLynxSdk`] can back the facade; [`WatersRawFile::open`] uses the native one.
//!
//! ```no_run
//! use lcms_parser::waters::{MassLynxSdk, WatersError, WatersRawFile};
//!
//! fn list_functions(sdk: &dyn MassLynxSdk) -> Result<(), WatersError> {
//!     let raw = WatersRawFile::open_with(sdk, "sample.raw", Some("XXXXXX"))?;
//!     for (mode, function) in raw.get_chromatogram_ids() {
//!         println!("{}: function {}", mode, function);
//!     }
//!     Ok(())
//! }
//! ```

pub mod check;
mod error;
#[cfg(feature = "masslynx")]
pub mod native;
mod raw_file;
mod sdk;

pub use check::{check_raw_file, CheckReport, CheckStatus, CheckStep, Plain, StepResult, Styler, Tally, Tone};
#[cfg(feature = "colorized_output")]
pub use check::Colored;
pub use error::WatersError;
pub use raw_file::{validate_raw_path, OpenOptions, WatersRawFile, HEADER_FILE_NAME};
pub use sdk::{MassLynxReader, MassLynxSdk, SdkArrays, SdkError};
