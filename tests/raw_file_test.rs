//! Integration tests for opening raw directories and reading traces and spectra
//! through a scripted MassLynx SDK.

mod common;

use std::path::Path;

use common::{raw_dir, sample_run, write_license, MockFunction, MockSdk};
use lcms_parser::license::{LicenseError, LicenseSource, LICENSE_FILE_NAME};
use lcms_parser::prelude::*;
use lcms_parser::waters::{check_raw_file, CheckStatus, CheckStep};
use tempfile::tempdir;

const KEY: &str = "XXXXXX";

fn open(
    sdk: &MockSdk,
    path: &Path,
    key: Option<&str>,
    license_dir: &Path,
) -> Result<WatersRawFile, WatersError> {
    let mut options = OpenOptions::new().license_dir(license_dir);
    if let Some(key) = key {
        options = options.license_key(key);
    }
    options.open_with(sdk, path)
}

fn es_plus() -> IonTraceMode {
    IonTraceMode::EsPositive
}

// ---------------------------------------------------------------------------
// License resolution and construction
// ---------------------------------------------------------------------------

#[test]
fn test_valid_license_opens_handle() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());

    let file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();
    assert_eq!(file.path(), raw.as_path());
    assert_eq!(file.license_source(), &LicenseSource::Explicit);
    assert_eq!(sdk.calls.opens.get(), 1);
}

#[test]
fn test_explicit_key_wins_over_license_file() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    write_license(dir.path(), "FILE-KEY");
    let sdk = MockSdk::new(KEY, sample_run());

    open(&sdk, &raw, Some(KEY), dir.path()).unwrap();
    assert_eq!(*sdk.calls.keys.borrow(), vec![KEY.to_string()]);
}

#[test]
fn test_license_file_fallback() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    write_license(dir.path(), &format!("  {}\n", KEY));
    let sdk = MockSdk::new(KEY, sample_run());

    let file = open(&sdk, &raw, None, dir.path()).unwrap();
    assert_eq!(
        file.license_source(),
        &LicenseSource::File(dir.path().join(LICENSE_FILE_NAME))
    );
    assert_eq!(*sdk.calls.keys.borrow(), vec![KEY.to_string()]);
}

#[test]
fn test_no_key_and_no_license_file() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());

    let err = open(&sdk, &raw, None, dir.path()).unwrap_err();
    assert!(matches!(
        err,
        WatersError::LicenseUnresolved(LicenseError::NotFound { .. })
    ));
    assert!(err.is_license_error());
    assert_eq!(sdk.calls.opens.get(), 0);
}

#[test]
fn test_blank_explicit_key_does_not_fall_back() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    write_license(dir.path(), KEY);
    let sdk = MockSdk::new(KEY, sample_run());

    let err = open(&sdk, &raw, Some("   "), dir.path()).unwrap_err();
    assert!(matches!(
        err,
        WatersError::LicenseUnresolved(LicenseError::Empty { .. })
    ));
    assert_eq!(sdk.calls.opens.get(), 0);
}

#[test]
fn test_missing_raw_path() {
    let dir = tempdir().unwrap();
    let sdk = MockSdk::new(KEY, sample_run());

    let err = open(&sdk, &dir.path().join("missing.raw"), Some(KEY), dir.path()).unwrap_err();
    assert!(matches!(err, WatersError::InvalidPath { .. }));
    assert!(!err.is_license_error());
    assert_eq!(sdk.calls.opens.get(), 0);
}

#[test]
fn test_license_checked_before_path() {
    let dir = tempdir().unwrap();
    let sdk = MockSdk::new(KEY, sample_run());

    let err = open(&sdk, &dir.path().join("missing.raw"), None, dir.path()).unwrap_err();
    assert!(matches!(err, WatersError::LicenseUnresolved(_)));
}

#[test]
fn test_rejected_key() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());

    let err = open(&sdk, &raw, Some("WRONG"), dir.path()).unwrap_err();
    assert!(matches!(err, WatersError::LicenseRejected(_)));
    assert!(err.is_license_error());
}

// ---------------------------------------------------------------------------
// Functions, channels and caching
// ---------------------------------------------------------------------------

#[test]
fn test_chromatogram_and_analog_ids() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let ids = file.get_chromatogram_ids();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[&IonTraceMode::EsPositive], 0);
    assert_eq!(ids[&IonTraceMode::EsNegative], 1);
    assert_eq!(file.scan_count(&es_plus()).unwrap(), 401);

    assert_eq!(
        file.get_analog_ids().unwrap(),
        vec![(0, "PDA 210-400 nm".to_string())]
    );
}

#[test]
fn test_duplicate_ion_mode_uses_last_function() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let mut run = sample_run();
    let first = run.functions[0].clone();
    run.functions = vec![
        first.clone(),
        MockFunction {
            mode: "ES+".to_string(),
            ..first
        },
    ];
    let sdk = MockSdk::new(KEY, run);
    let file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    assert_eq!(file.get_chromatogram_ids().len(), 1);
    assert_eq!(file.get_chromatogram_ids()[&es_plus()], 1);
}

#[test]
fn test_traces_are_read_once() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let len = file.get_trace(&es_plus()).unwrap().len();
    assert_eq!(len, 401);
    file.get_trace(&es_plus()).unwrap();
    assert_eq!(sdk.calls.tic_reads.get(), 1);

    let trace = file.get_analog_trace(0).unwrap();
    assert_eq!(trace.description, "PDA 210-400 nm");
    let max = trace.intensities.iter().copied().fold(f64::MIN, f64::max);
    assert_eq!(max, 1.0);
    file.get_analog_trace(0).unwrap();
    assert_eq!(sdk.calls.analog_reads.get(), 1);
}

#[test]
fn test_unscaled_analog_trace() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = OpenOptions::new()
        .license_key(KEY)
        .scale_analog(false)
        .open_with(&sdk, &raw)
        .unwrap();

    let trace = file.get_analog_trace(0).unwrap();
    let max = trace.intensities.iter().copied().fold(f64::MIN, f64::max);
    assert!((max - 0.04).abs() < 1e-4);
}

#[test]
fn test_unknown_mode_and_channel() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    assert!(matches!(
        file.get_trace(&IonTraceMode::ApciPositive),
        Err(WatersError::TraceNotFound(IonTraceMode::ApciPositive))
    ));
    assert!(matches!(
        file.get_analog_trace(5),
        Err(WatersError::ChannelNotFound(5))
    ));
    assert_eq!(sdk.calls.tic_reads.get(), 0);
    assert_eq!(sdk.calls.analog_reads.get(), 0);
}

// ---------------------------------------------------------------------------
// Peaks and mass spectra
// ---------------------------------------------------------------------------

#[test]
fn test_trace_peaks_are_cached() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let peaks = file
        .get_trace(&es_plus())
        .unwrap()
        .get_peaks(&PeakPickingParams::default());
    assert_eq!(peaks.len(), 2);
    assert!((peaks[0].time.as_minutes() - 1.0).abs() < 0.011);
    assert!((peaks[1].time.as_minutes() - 2.0).abs() < 0.011);
    assert!(peaks[1].integral > peaks[0].integral);
    assert_eq!(peaks[0].mode, es_plus());

    assert_eq!(file.get_trace(&es_plus()).unwrap().peaks, peaks);
}

#[test]
fn test_mass_spectrum_averaging() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let spectrum = file.get_mass_spectrum(1.0, &es_plus(), 2).unwrap();
    assert_eq!(
        *sdk.calls.scan_reads.borrow(),
        vec![(0, 98), (0, 99), (0, 100), (0, 101), (0, 102)]
    );
    assert_eq!(spectrum.mode, es_plus());
    assert_eq!(spectrum.intensities, vec![100.0, 200.0, 1.0]);
    // Masses come from the last scan read
    assert_eq!(spectrum.masses, vec![100.0, 200.0, 402.0]);
}

#[test]
fn test_mass_spectrum_single_scan() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let spectrum = file
        .get_mass_spectrum(chrono::TimeDelta::seconds(90), &IonTraceMode::EsNegative, 0)
        .unwrap();
    assert_eq!(*sdk.calls.scan_reads.borrow(), vec![(1, 150)]);
    assert_eq!(spectrum.masses, vec![101.0, 200.0, 450.0]);
    assert_eq!(spectrum.base_peak().map(|p| p.mass), Some(200.0));
}

#[test]
fn test_mass_spectrum_rejects_non_finite_time() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    for time in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            file.get_mass_spectrum(time, &es_plus(), 0),
            Err(WatersError::InvalidRetentionTime(_))
        ));
    }
    assert!(sdk.calls.scan_reads.borrow().is_empty());
}

#[test]
fn test_mass_spectrum_window_is_clamped() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let start = file.get_mass_spectrum(0.0, &es_plus(), 3).unwrap();
    assert_eq!(start.intensities, vec![1.5, 3.0, 1.0]);

    let end = file.get_mass_spectrum(10.0, &es_plus(), 5).unwrap();
    assert_eq!(end.intensities, vec![397.5, 795.0, 1.0]);
    assert_eq!(end.masses[2], 700.0);
}

#[test]
fn test_mass_spectrum_shape_mismatch() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let mut run = sample_run();
    run.ragged_scan = Some(101);
    let sdk = MockSdk::new(KEY, run);
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let err = file.get_mass_spectrum(1.0, &es_plus(), 2).unwrap_err();
    assert!(matches!(
        err,
        WatersError::SpectrumShapeMismatch {
            scan: 101,
            expected: 3,
            found: 2
        }
    ));
}

#[test]
fn test_peak_mass_spectrum_picks_peaks_on_demand() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let spectrum = file.get_peak_mass_spectrum(&es_plus(), 1, 1).unwrap();
    assert_eq!(spectrum.intensities, vec![200.0, 400.0, 1.0]);
    assert_eq!(file.get_trace(&es_plus()).unwrap().peaks.len(), 2);

    let err = file.get_peak_mass_spectrum(&es_plus(), 2, 0).unwrap_err();
    assert!(matches!(
        err,
        WatersError::PeakNotFound {
            index: 2,
            available: 2,
            ..
        }
    ));
}

#[test]
fn test_peak_mass_spectrum_uses_cached_peaks() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());
    let mut file = open(&sdk, &raw, Some(KEY), dir.path()).unwrap();

    let params = PeakPickingParams {
        run_end: 1.5,
        ..PeakPickingParams::default()
    };
    file.get_trace(&es_plus()).unwrap().get_peaks(&params);

    assert!(file.get_peak_mass_spectrum(&es_plus(), 0, 0).is_ok());
    assert!(matches!(
        file.get_peak_mass_spectrum(&es_plus(), 1, 0),
        Err(WatersError::PeakNotFound { available: 1, .. })
    ));
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[test]
fn test_check_report_passes() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());

    let report = check_raw_file(Ok(&sdk), &raw, Some(KEY), Some(dir.path()));
    assert!(!report.has_failures(), "{}", report);
    assert!(!report.has_warnings());
    assert_eq!(report.tally().passed, CheckStep::ALL.len());
    assert_eq!(report.license_source, Some(LicenseSource::Explicit));
    assert_eq!(
        report.ion_modes,
        vec![IonTraceMode::EsPositive, IonTraceMode::EsNegative]
    );
    assert_eq!(report.analog_channels, Some(1));
}

#[test]
fn test_check_report_rejected_key() {
    let dir = tempdir().unwrap();
    let raw = raw_dir(dir.path(), "test.raw");
    let sdk = MockSdk::new(KEY, sample_run());

    let report = check_raw_file(Ok(&sdk), &raw, Some("WRONG"), Some(dir.path()));
    assert_eq!(report.tally().failed, 1);
    assert!(matches!(
        report.status(CheckStep::LicenseAccepted),
        Some(CheckStatus::Failed(m)) if m.contains("rejected")
    ));
    assert_eq!(report.status(CheckStep::Functions), Some(&CheckStatus::Skipped));
    assert_eq!(report.status(CheckStep::AnalogChannels), Some(&CheckStatus::Skipped));
    assert!(report.ion_modes.is_empty());
}
