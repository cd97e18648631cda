//! 1-D signal processing for chromatographic and spectral peak detection.
//!
//! The functions here follow the conventional `scipy.signal` semantics so that peak
//! lists agree with established LC-MS tooling:
//!
//! 1. Local maxima, with flat plateaus reported at their (floor) midpoint
//! 2. Prominence: height above the higher of the two surrounding minima, searched until
//!    a higher sample or the signal boundary
//! 3. Width at a relative height of the prominence, linearly interpolated and bounded by
//!    the prominence bases
//! 4. Trapezoidal integration with unit spacing
//!
//! All functions are total: degenerate input yields empty results rather than errors.

use serde::{Deserialize, Serialize};

/// Filters applied by [`find_peaks`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindPeaksParams {
    /// Minimum peak height (absolute)
    pub min_height: Option<f64>,
    /// Minimum prominence
    pub min_prominence: Option<f64>,
    /// Minimum horizontal distance between peaks in samples; lower peaks within this
    /// distance of a higher one are dropped
    pub distance: Option<usize>,
}

/// Prominence of a single peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prominence {
    /// Height above the higher of the two bases
    pub prominence: f64,
    /// Index of the left base
    pub left_base: usize,
    /// Index of the right base
    pub right_base: usize,
}

/// Width of a single peak at a relative height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakWidth {
    /// Width in samples (may be fractional)
    pub width: f64,
    /// The signal height at which the width was evaluated
    pub width_height: f64,
    /// Interpolated left crossing position
    pub left_ip: f64,
    /// Interpolated right crossing position
    pub right_ip: f64,
}

/// Find all local maxima. Plateaus are reported once at their midpoint.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }
            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Detect peaks in `x` and filter them with `params`.
///
/// Filters are applied in the order height, distance, prominence. The returned indices
/// are sorted.
pub fn find_peaks(x: &[f64], params: &FindPeaksParams) -> Vec<usize> {
    let mut peaks = local_maxima(x);

    if let Some(min_height) = params.min_height {
        peaks.retain(|&p| x[p] >= min_height);
    }

    if let Some(distance) = params.distance {
        if distance > 1 {
            peaks = select_by_distance(x, &peaks, distance);
        }
    }

    if let Some(min_prominence) = params.min_prominence {
        let prominences = peak_prominences(x, &peaks);
        peaks = peaks
            .into_iter()
            .zip(prominences)
            .filter(|(_, p)| p.prominence >= min_prominence)
            .map(|(idx, _)| idx)
            .collect();
    }

    peaks
}

/// Keep the highest peaks, dropping any lower peak closer than `distance` samples.
fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    let mut priority: Vec<usize> = (0..peaks.len()).collect();
    priority.sort_by(|&a, &b| {
        x[peaks[a]]
            .partial_cmp(&x[peaks[b]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &j in priority.iter().rev() {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(p, _)| *p)
        .collect()
}

/// Compute the prominence and bases of each peak in `peaks`.
///
/// # Panics
/// Panics if an index in `peaks` is out of bounds for `x`.
pub fn peak_prominences(x: &[f64], peaks: &[usize]) -> Vec<Prominence> {
    peaks
        .iter()
        .map(|&peak| {
            let height = x[peak];

            let mut left_base = peak;
            let mut left_min = height;
            let mut i = peak;
            loop {
                if x[i] > height {
                    break;
                }
                if x[i] < left_min {
                    left_min = x[i];
                    left_base = i;
                }
                if i == 0 {
                    break;
                }
                i -= 1;
            }

            let mut right_base = peak;
            let mut right_min = height;
            for (i, &value) in x.iter().enumerate().skip(peak) {
                if value > height {
                    break;
                }
                if value < right_min {
                    right_min = value;
                    right_base = i;
                }
            }

            Prominence {
                prominence: height - left_min.max(right_min),
                left_base,
                right_base,
            }
        })
        .collect()
}

/// Compute the width of each peak at `rel_height` of its prominence.
///
/// A `rel_height` of 0.5 gives the width at half prominence, 1.0 the width at the
/// lowest contour line. Negative values are treated as 0.
///
/// # Panics
/// Panics if an index in `peaks` is out of bounds for `x`.
pub fn peak_widths(x: &[f64], peaks: &[usize], rel_height: f64) -> Vec<PeakWidth> {
    let rel_height = rel_height.max(0.0);
    let prominences = peak_prominences(x, peaks);

    peaks
        .iter()
        .zip(prominences)
        .map(|(&peak, prom)| {
            let height = x[peak] - prom.prominence * rel_height;

            let mut i = peak;
            while prom.left_base < i && height < x[i] {
                i -= 1;
            }
            let mut left_ip = i as f64;
            if x[i] < height {
                left_ip += (height - x[i]) / (x[i + 1] - x[i]);
            }

            let mut i = peak;
            while i < prom.right_base && height < x[i] {
                i += 1;
            }
            let mut right_ip = i as f64;
            if x[i] < height {
                right_ip -= (height - x[i]) / (x[i - 1] - x[i]);
            }

            PeakWidth {
                width: right_ip - left_ip,
                width_height: height,
                left_ip,
                right_ip,
            }
        })
        .collect()
}

/// Integrate `y` with the trapezoidal rule and unit sample spacing.
pub fn trapezoid(y: &[f64]) -> f64 {
    y.windows(2).map(|w| (w[0] + w[1]) / 2.0).sum()
}
