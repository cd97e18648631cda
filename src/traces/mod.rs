//! # Chromatographic Traces
//!
//! Time-resolved traces read from a raw file: total ion current traces for each MS
//! function ([`TicTrace`]) and analog detector channels such as UV/DAD ([`AnalogTrace`]).
//!
//! Both kinds support peak picking over the useful part of a run. The region before the
//! solvent front and after the end of the actual separation (e.g. a column flush) is
//! ignored; see [`PeakPickingParams`].

mod analog;
mod ion;

pub use analog::{AnalogTrace, AnalogTracePeak};
pub use ion::{TicTrace, TicTracePeak};

use serde::{Deserialize, Serialize};

use crate::helpers::RetentionTime;
use crate::signal::{find_peaks, peak_widths, trapezoid, FindPeaksParams};

/// Common access to a time/intensity trace.
pub trait Trace {
    /// Retention times in minutes
    fn times(&self) -> &[f64];

    /// Intensities, parallel to [`Trace::times`]
    fn intensities(&self) -> &[f64];

    /// Number of points in the trace
    fn len(&self) -> usize {
        self.times().len().min(self.intensities().len())
    }

    /// Whether the trace has no points
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the point closest in time to `time`, or `None` for an empty trace.
    ///
    /// On ties the earlier point wins.
    fn scan_index(&self, time: RetentionTime) -> Option<usize> {
        nearest_index(self.times(), time.as_minutes())
    }
}

/// Parameters for picking peaks in a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakPickingParams {
    /// Time of the solvent front in minutes; earlier points are ignored
    pub solvent_front: f64,

    /// End of the actual run in minutes; later points are ignored
    pub run_end: f64,

    /// Fraction of the peak prominence at which width and integral are evaluated
    pub rel_height: f64,

    /// Store each integral as a fraction of the summed integrals (area percent)
    pub scale_integrals: bool,

    /// Filters passed to peak detection
    #[serde(flatten)]
    pub detection: FindPeaksParams,
}

impl Default for PeakPickingParams {
    fn default() -> Self {
        Self {
            solvent_front: 0.4,
            run_end: 3.0,
            rel_height: 0.95,
            scale_integrals: true,
            detection: FindPeaksParams::default(),
        }
    }
}

/// A peak found by [`pick_peaks`], independent of the trace kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PickedPeak {
    pub time: RetentionTime,
    pub intensity: f64,
    pub integral: f64,
    pub relative_height: f64,
    pub lhs: RetentionTime,
    pub rhs: RetentionTime,
}

pub(crate) fn nearest_index(times: &[f64], time: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, t) in times.iter().enumerate() {
        let distance = (t - time).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ if distance.is_nan() => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

pub(crate) fn pick_peaks(times: &[f64], intensities: &[f64], params: &PeakPickingParams) -> Vec<PickedPeak> {
    let n = times.len().min(intensities.len());
    let times = &times[..n];
    let intensities = &intensities[..n];

    let (Some(start), Some(end)) = (
        nearest_index(times, params.solvent_front),
        nearest_index(times, params.run_end),
    ) else {
        return Vec::new();
    };
    if end <= start {
        log::debug!(
            "Empty peak picking window: solvent front {} min, run end {} min",
            params.solvent_front,
            params.run_end
        );
        return Vec::new();
    }

    let run_times = &times[start..end];
    let run_int = &intensities[start..end];

    let peaks = find_peaks(run_int, &params.detection);
    let widths = peak_widths(run_int, &peaks, params.rel_height);

    let boundary = |ip: f64| (ip.round_ties_even() as usize).min(run_int.len() - 1);

    let integrals: Vec<f64> = widths
        .iter()
        .map(|w| {
            let lhs = boundary(w.left_ip);
            let rhs = boundary(w.right_ip).max(lhs);
            let baseline: Vec<f64> = run_int[lhs..rhs].iter().map(|y| y - w.width_height).collect();
            trapezoid(&baseline)
        })
        .collect();
    let total_area: f64 = integrals.iter().sum();

    peaks
        .iter()
        .zip(widths.iter())
        .zip(integrals)
        .map(|((&idx, w), integral)| PickedPeak {
            time: RetentionTime::from_minutes(run_times[idx]),
            intensity: run_int[idx],
            integral: if params.scale_integrals && total_area != 0.0 {
                integral / total_area
            } else {
                integral
            },
            relative_height: w.width_height,
            lhs: RetentionTime::from_minutes(run_times[boundary(w.left_ip)]),
            rhs: RetentionTime::from_minutes(run_times[boundary(w.right_ip)]),
        })
        .collect()
}
