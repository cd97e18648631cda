//! Property-based tests for license precedence and peak detection.

use lcms_parser::license::{LicenseResolver, LicenseSource, LICENSE_FILE_NAME};
use lcms_parser::signal::{find_peaks, local_maxima, peak_prominences, peak_widths, FindPeaksParams};
use proptest::prelude::*;
use tempfile::tempdir;

fn key() -> impl Strategy<Value = String> {
    "[A-Z0-9]{1,24}"
}

fn signal() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e3f64..1.0e3, 0..200)
}

proptest! {
    /// An explicit key is used whatever the license file contains
    #[test]
    fn test_explicit_key_always_wins(explicit in key(), file_key in key()) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(LICENSE_FILE_NAME), &file_key).unwrap();

        let resolved = LicenseResolver::in_dir(dir.path()).resolve(Some(&explicit)).unwrap();
        prop_assert_eq!(resolved.key.as_str(), explicit.as_str());
        prop_assert_eq!(resolved.source, LicenseSource::Explicit);
    }

    /// Without an explicit key the trimmed file content is used
    #[test]
    fn test_file_key_trimmed(file_key in key(), pad in "[ \t\r\n]{0,4}") {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(LICENSE_FILE_NAME), format!("{pad}{file_key}{pad}")).unwrap();

        let resolved = LicenseResolver::in_dir(dir.path()).resolve(None).unwrap();
        prop_assert_eq!(resolved.key.as_str(), file_key.as_str());
    }

    /// Detected peaks are sorted interior local maxima
    #[test]
    fn test_peaks_are_local_maxima(x in signal()) {
        let peaks = local_maxima(&x);
        for window in peaks.windows(2) {
            prop_assert!(window[0] < window[1]);
        }
        for &p in &peaks {
            prop_assert!(p > 0 && p + 1 < x.len());
            prop_assert!(x[p - 1] < x[p]);
            prop_assert!(x[p + 1] <= x[p]);
        }
    }

    /// Prominences are non-negative and the bases bracket the peak
    #[test]
    fn test_prominence_bounds(x in signal()) {
        let peaks = local_maxima(&x);
        for (p, prom) in peaks.iter().zip(peak_prominences(&x, &peaks)) {
            prop_assert!(prom.prominence >= 0.0);
            prop_assert!(prom.left_base <= *p && *p <= prom.right_base);
        }
    }

    /// Widths are non-negative and the crossings stay inside the signal
    #[test]
    fn test_width_bounds(x in signal(), rel_height in 0.0f64..1.0) {
        let peaks = local_maxima(&x);
        for (p, w) in peaks.iter().zip(peak_widths(&x, &peaks, rel_height)) {
            prop_assert!(w.width >= 0.0);
            prop_assert!(w.left_ip >= 0.0 && w.left_ip <= *p as f64);
            prop_assert!(w.right_ip >= *p as f64 && w.right_ip <= (x.len() - 1) as f64);
        }
    }

    /// Filters only ever remove peaks
    #[test]
    fn test_filters_are_subsets(x in signal(), height in -1.0e3f64..1.0e3, distance in 1usize..20) {
        let all = find_peaks(&x, &FindPeaksParams::default());
        let params = FindPeaksParams {
            min_height: Some(height),
            min_prominence: Some(1.0),
            distance: Some(distance),
        };
        for p in find_peaks(&x, &params) {
            prop_assert!(all.contains(&p));
            prop_assert!(x[p] >= height);
        }
    }
}
