use anyhow::Result;
use std::path::Path;

use lcms_parser::helpers::IonTraceMode;
use lcms_parser::traces::Trace;

use super::{print_json, Settings};

fn print_points(times: &[f64], intensities: &[f64]) {
    println!("{:>10}  {:>14}", "time_min", "intensity");
    for (t, y) in times.iter().zip(intensities) {
        println!("{:>10.4}  {:>14.6}", t, y);
    }
}

/// Print the TIC trace of an ion mode
pub fn run_tic(settings: &Settings, raw: &Path, mode: &str, json: bool) -> Result<()> {
    let mut file = settings.open(raw, true, settings.peaks.clone())?;
    let mode = IonTraceMode::from(mode);
    let trace = file.get_trace(&mode)?;

    if json {
        return print_json(&*trace);
    }

    println!("# {} TIC, {} points", trace.mode, trace.len());
    print_points(&trace.times, &trace.intensities);
    Ok(())
}

/// Print an analog trace
pub fn run_analog(
    settings: &Settings,
    raw: &Path,
    channel: usize,
    scale: bool,
    json: bool,
) -> Result<()> {
    let mut file = settings.open(raw, scale, settings.peaks.clone())?;
    let trace = file.get_analog_trace(channel)?;

    if json {
        return print_json(&*trace);
    }

    println!("# {}, {} points", trace.description, trace.len());
    print_points(&trace.times, &trace.intensities);
    Ok(())
}
