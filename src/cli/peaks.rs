use anyhow::Result;
use log::info;
use std::path::Path;

use lcms_parser::helpers::{IonTraceMode, RetentionTime};
use lcms_parser::traces::PeakPickingParams;

use super::{print_json, Settings};

/// Which trace to pick peaks on
pub enum Target {
    /// TIC trace of an ion mode
    Tic(String),
    /// Analog channel
    Analog(usize),
}

fn print_row(i: usize, time: RetentionTime, intensity: f64, integral: f64, lhs: RetentionTime, rhs: RetentionTime) {
    println!(
        "{:>4}  {:>8.3}  {:>14.6}  {:>10.4}  {:>8.3}  {:>8.3}",
        i,
        time.as_minutes(),
        intensity,
        integral,
        lhs.as_minutes(),
        rhs.as_minutes()
    );
}

/// Pick and print peaks
pub fn run(
    settings: &Settings,
    raw: &Path,
    target: Target,
    params: &PeakPickingParams,
    json: bool,
) -> Result<()> {
    let mut file = settings.open(raw, true, params.clone())?;
    info!(
        "Picking peaks between {} and {} min",
        params.solvent_front, params.run_end
    );

    let header = || {
        println!(
            "{:>4}  {:>8}  {:>14}  {:>10}  {:>8}  {:>8}",
            "#", "time", "intensity", "integral", "lhs", "rhs"
        )
    };

    match target {
        Target::Tic(mode) => {
            let mode = IonTraceMode::from(mode.as_str());
            let peaks = file.get_trace(&mode)?.get_peaks(params);
            if json {
                return print_json(&peaks);
            }
            println!("# {} TIC: {} peaks", mode, peaks.len());
            header();
            for (i, p) in peaks.iter().enumerate() {
                print_row(i, p.time, p.intensity, p.integral, p.lhs, p.rhs);
            }
        }
        Target::Analog(channel) => {
            let trace = file.get_analog_trace(channel)?;
            let peaks = trace.get_peaks(params);
            if json {
                return print_json(&peaks);
            }
            println!("# {}: {} peaks", trace.description, peaks.len());
            header();
            for (i, p) in peaks.iter().enumerate() {
                print_row(i, p.time, p.intensity, p.integral, p.lhs, p.rhs);
            }
        }
    }

    Ok(())
}
