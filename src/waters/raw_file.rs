//! The Waters raw file facade.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::error::WatersError;
use super::sdk::{widen, MassLynxReader, MassLynxSdk};
use crate::helpers::{IonTraceMode, RetentionTime};
use crate::license::{LicenseResolver, LicenseSource, ResolvedLicense};
use crate::msdata::MassSpectrum;
use crate::traces::{AnalogTrace, PeakPickingParams, TicTrace, Trace};

/// Header file every Waters raw directory contains.
pub const HEADER_FILE_NAME: &str = "_HEADER.TXT";

/// Check that `path` looks like a Waters raw directory.
///
/// The path must exist, be a directory with a `.raw` extension (any case) and contain a
/// `_HEADER.TXT` file (any case).
pub fn validate_raw_path(path: &Path) -> Result<(), WatersError> {
    let invalid = |reason: String| WatersError::InvalidPath {
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(invalid("path does not exist".to_string()));
    }

    if !path.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }

    if path.extension().map(|e| e.to_ascii_lowercase()) != Some("raw".into()) {
        return Err(invalid("expected .raw extension".to_string()));
    }

    let entries = std::fs::read_dir(path).map_err(|e| invalid(format!("cannot list directory: {}", e)))?;
    let has_header = entries
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().eq_ignore_ascii_case(HEADER_FILE_NAME));
    if !has_header {
        return Err(invalid(format!("missing {}", HEADER_FILE_NAME)));
    }

    Ok(())
}

/// Options for opening a [`WatersRawFile`].
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "masslynx")]
/// # fn main() -> Result<(), lcms_parser::waters::WatersError> {
/// use lcms_parser::waters::OpenOptions;
///
/// let raw = OpenOptions::new()
///     .license_key("XXXXXX")
///     .scale_analog(false)
///     .open("sample.raw")?;
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "masslynx"))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    license_key: Option<String>,
    license_dir: Option<PathBuf>,
    scale_analog: bool,
    peak_params: PeakPickingParams,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            license_key: None,
            license_dir: None,
            scale_analog: true,
            peak_params: PeakPickingParams::default(),
        }
    }
}

impl OpenOptions {
    /// Default options: license from `./license.key`, analog traces scaled
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `key` instead of the license file
    pub fn license_key(mut self, key: impl Into<String>) -> Self {
        self.license_key = Some(key.into());
        self
    }

    /// Look for `license.key` in `dir` instead of the working directory
    pub fn license_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.license_dir = Some(dir.into());
        self
    }

    /// Scale analog traces to a maximum of 1.0 (default `true`)
    pub fn scale_analog(mut self, scale: bool) -> Self {
        self.scale_analog = scale;
        self
    }

    /// Parameters used when peaks are picked implicitly by
    /// [`WatersRawFile::get_peak_mass_spectrum`]
    pub fn peak_params(mut self, params: PeakPickingParams) -> Self {
        self.peak_params = params;
        self
    }

    fn resolver(&self) -> LicenseResolver {
        match &self.license_dir {
            Some(dir) => LicenseResolver::in_dir(dir),
            None => LicenseResolver::from_current_dir(),
        }
    }

    /// Open `path` with the native MassLynx SDK.
    #[cfg(feature = "masslynx")]
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<WatersRawFile, WatersError> {
        let path = path.as_ref();
        // License and path problems are reported before the SDK is loaded
        let license = self.resolve_and_validate(path)?;
        let sdk = super::native::NativeSdk::load()?;
        self.open_resolved(&sdk, path, license)
    }

    /// Open `path` through `sdk`.
    ///
    /// # Errors
    /// - `WatersError::LicenseUnresolved` if no key was given and no license file was found
    /// - `WatersError::InvalidPath` if `path` is not a Waters raw directory
    /// - `WatersError::LicenseRejected` if the SDK does not accept the key
    /// - `WatersError::SdkUnavailable` or `WatersError::Sdk` if the SDK fails
    pub fn open_with<P: AsRef<Path>>(
        &self,
        sdk: &dyn MassLynxSdk,
        path: P,
    ) -> Result<WatersRawFile, WatersError> {
        let path = path.as_ref();
        let license = self.resolve_and_validate(path)?;
        self.open_resolved(sdk, path, license)
    }

    fn resolve_and_validate(&self, path: &Path) -> Result<ResolvedLicense, WatersError> {
        let license = self.resolver().resolve(self.license_key.as_deref())?;
        validate_raw_path(path)?;
        Ok(license)
    }

    fn open_resolved(
        &self,
        sdk: &dyn MassLynxSdk,
        path: &Path,
        license: ResolvedLicense,
    ) -> Result<WatersRawFile, WatersError> {
        let reader = sdk.open(path, &license.key)?;

        let mut functions = BTreeMap::new();
        for function in 0..reader.function_count()? {
            let mode = IonTraceMode::from(reader.function_ion_mode(function)?.as_str());
            if let Some(previous) = functions.insert(mode.clone(), function) {
                debug!(
                    "Functions {} and {} both report {}, using {}",
                    previous, function, mode, function
                );
            }
        }

        info!(
            "Opened {} ({} ion modes, license from {})",
            path.display(),
            functions.len(),
            license.source
        );

        Ok(WatersRawFile {
            path: path.to_path_buf(),
            license_source: license.source,
            reader,
            functions,
            scale_analog: self.scale_analog,
            peak_params: self.peak_params.clone(),
            traces: HashMap::new(),
            analog_traces: HashMap::new(),
        })
    }
}

/// An open Waters `.raw` directory.
///
/// Traces are read from the SDK on first access and cached. The SDK readers are released
/// when the handle is dropped.
pub struct WatersRawFile {
    path: PathBuf,
    license_source: LicenseSource,
    reader: Box<dyn MassLynxReader>,
    functions: BTreeMap<IonTraceMode, usize>,
    scale_analog: bool,
    peak_params: PeakPickingParams,
    traces: HashMap<IonTraceMode, TicTrace>,
    analog_traces: HashMap<usize, AnalogTrace>,
}

impl fmt::Debug for WatersRawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatersRawFile")
            .field("path", &self.path)
            .field("license_source", &self.license_source)
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

impl WatersRawFile {
    /// Open `path` with the native MassLynx SDK.
    ///
    /// The license key is `license_key` when given, otherwise the contents of
    /// `license.key` in the current working directory.
    #[cfg(feature = "masslynx")]
    pub fn open<P: AsRef<Path>>(path: P, license_key: Option<&str>) -> Result<Self, WatersError> {
        Self::options(license_key).open(path)
    }

    /// Open `path` through `sdk`, resolving the license like [`WatersRawFile::open`].
    pub fn open_with<P: AsRef<Path>>(
        sdk: &dyn MassLynxSdk,
        path: P,
        license_key: Option<&str>,
    ) -> Result<Self, WatersError> {
        Self::options(license_key).open_with(sdk, path)
    }

    fn options(license_key: Option<&str>) -> OpenOptions {
        match license_key {
            Some(key) => OpenOptions::new().license_key(key),
            None => OpenOptions::new(),
        }
    }

    /// Path of the raw directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the license key came from
    pub fn license_source(&self) -> &LicenseSource {
        &self.license_source
    }

    /// Function number for each ion mode
    pub fn get_chromatogram_ids(&self) -> &BTreeMap<IonTraceMode, usize> {
        &self.functions
    }

    fn function(&self, mode: &IonTraceMode) -> Result<usize, WatersError> {
        self.functions
            .get(mode)
            .copied()
            .ok_or_else(|| WatersError::TraceNotFound(mode.clone()))
    }

    /// Number of scans recorded for `mode`
    pub fn scan_count(&self, mode: &IonTraceMode) -> Result<usize, WatersError> {
        let function = self.function(mode)?;
        Ok(self.reader.scan_count(function)?)
    }

    /// Analog channels as `(channel id, description)`, descriptions trimmed
    pub fn get_analog_ids(&self) -> Result<Vec<(usize, String)>, WatersError> {
        let count = self.reader.analog_channel_count()?;
        (0..count)
            .map(|channel| {
                let description = self.reader.analog_channel_description(channel)?;
                Ok((channel, description.trim().to_string()))
            })
            .collect()
    }

    /// The analog trace of `channel`, read on first access.
    pub fn get_analog_trace(&mut self, channel: usize) -> Result<&mut AnalogTrace, WatersError> {
        if self.analog_traces.contains_key(&channel) {
            debug!("Analog channel {} served from cache", channel);
        } else {
            let count = self.reader.analog_channel_count()?;
            if channel >= count {
                return Err(WatersError::ChannelNotFound(channel));
            }
            let description = self.reader.analog_channel_description(channel)?;
            let (times, intensities) = self.reader.read_analog_channel(channel)?;
            debug!("Read analog channel {}: {} points", channel, times.len());
            let trace = AnalogTrace::new(
                widen(times),
                widen(intensities),
                description.trim(),
                self.scale_analog,
            );
            self.analog_traces.insert(channel, trace);
        }
        self.analog_traces
            .get_mut(&channel)
            .ok_or(WatersError::ChannelNotFound(channel))
    }

    /// The TIC trace of `mode`, read on first access.
    pub fn get_trace(&mut self, mode: &IonTraceMode) -> Result<&mut TicTrace, WatersError> {
        if self.traces.contains_key(mode) {
            debug!("{} trace served from cache", mode);
        } else {
            let function = self.function(mode)?;
            let (times, intensities) = self.reader.read_tic(function)?;
            debug!("Read {} TIC from function {}: {} points", mode, function, times.len());
            let trace = TicTrace::new(mode.clone(), widen(times), widen(intensities));
            self.traces.insert(mode.clone(), trace);
        }
        self.traces
            .get_mut(mode)
            .ok_or_else(|| WatersError::TraceNotFound(mode.clone()))
    }

    /// Mass spectrum at the scan closest to `time` on the `mode` trace.
    ///
    /// With `average > 0`, the `average` scans on each side are read as well (clamped to
    /// the scans of the function) and the intensities are averaged point by point. The
    /// masses are taken from the last scan read.
    ///
    /// # Errors
    /// - `WatersError::InvalidRetentionTime` if `time` is NaN or infinite
    /// - `WatersError::SpectrumShapeMismatch` if the averaged scans differ in length
    pub fn get_mass_spectrum(
        &mut self,
        time: impl Into<RetentionTime>,
        mode: &IonTraceMode,
        average: usize,
    ) -> Result<MassSpectrum, WatersError> {
        let time = time.into();
        if !time.as_minutes().is_finite() {
            return Err(WatersError::InvalidRetentionTime(time.as_minutes()));
        }
        let function = self.function(mode)?;
        let scan_count = self.reader.scan_count(function)?;

        let index = self.get_trace(mode)?.scan_index(time);
        let Some(index) = index.filter(|_| scan_count > 0) else {
            warn!("{} trace has no scans, returning an empty spectrum", mode);
            return Ok(MassSpectrum::new(mode.clone(), Vec::new(), Vec::new()));
        };
        let index = index.min(scan_count - 1);

        let first = index.saturating_sub(average);
        let last = index.saturating_add(average).min(scan_count - 1);
        debug!(
            "{} spectrum at {}: scans {}..={} of function {}",
            mode, time, first, last, function
        );

        let mut masses = Vec::new();
        let mut sums: Vec<f64> = Vec::new();
        for scan in first..=last {
            let (scan_masses, scan_intensities) = self.reader.read_scan(function, scan)?;
            if scan == first {
                sums = vec![0.0; scan_intensities.len()];
            } else if scan_intensities.len() != sums.len() {
                return Err(WatersError::SpectrumShapeMismatch {
                    scan,
                    expected: sums.len(),
                    found: scan_intensities.len(),
                });
            }
            for (sum, value) in sums.iter_mut().zip(scan_intensities) {
                *sum += f64::from(value);
            }
            masses = scan_masses;
        }

        let scans = (last - first + 1) as f64;
        let intensities = sums.into_iter().map(|sum| sum / scans).collect();
        Ok(MassSpectrum::new(mode.clone(), widen(masses), intensities))
    }

    /// Mass spectrum at the apex of peak `peak_index` of the `mode` trace.
    ///
    /// Peaks already found on the trace are used; when there are none they are picked
    /// with the parameters given in [`OpenOptions::peak_params`].
    pub fn get_peak_mass_spectrum(
        &mut self,
        mode: &IonTraceMode,
        peak_index: usize,
        average: usize,
    ) -> Result<MassSpectrum, WatersError> {
        let params = self.peak_params.clone();
        let trace = self.get_trace(mode)?;
        if trace.peaks.is_empty() {
            trace.get_peaks(&params);
        }
        let available = trace.peaks.len();
        let time = trace
            .peaks
            .get(peak_index)
            .map(|peak| peak.time)
            .ok_or_else(|| WatersError::PeakNotFound {
                mode: mode.clone(),
                index: peak_index,
                available,
            })?;
        self.get_mass_spectrum(time, mode, average)
    }
}
