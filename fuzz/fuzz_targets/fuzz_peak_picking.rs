#![no_main]

use libfuzzer_sys::fuzz_target;

use lcms_parser::signal::{find_peaks, peak_widths, trapezoid, FindPeaksParams};
use lcms_parser::traces::{AnalogTrace, PeakPickingParams};

fuzz_target!(|data: &[u8]| {
    // Interpret the input as little-endian f64 samples
    let values: Vec<f64> = data
        .chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .filter(|v| v.is_finite())
        .collect();

    // Peak detection must never panic, whatever the signal looks like
    let params = FindPeaksParams {
        min_prominence: Some(0.0),
        distance: Some(3),
        ..FindPeaksParams::default()
    };
    let peaks = find_peaks(&values, &params);
    let _ = peak_widths(&values, &peaks, 0.95);
    let _ = trapezoid(&values);

    // Same for trace peak picking over an arbitrary time axis
    let times: Vec<f64> = (0..values.len()).map(|i| i as f64 * 0.01).collect();
    let mut trace = AnalogTrace::new(times, values, "fuzz", true);
    let _ = trace.get_peaks(&PeakPickingParams::default());
});
