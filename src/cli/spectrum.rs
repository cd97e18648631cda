use anyhow::Result;
use std::path::Path;

use lcms_parser::helpers::IonTraceMode;
use lcms_parser::msdata::MassPeak;
use lcms_parser::traces::PeakPickingParams;

use super::{print_json, Settings};

/// Where to take the spectrum
pub enum At {
    /// Retention time in minutes
    Time(f64),
    /// Apex of a TIC peak
    Peak(usize),
}

/// Extract and print a mass spectrum
#[allow(clippy::too_many_arguments)]
pub fn run(
    settings: &Settings,
    raw: &Path,
    mode: &str,
    at: At,
    average: usize,
    top: Option<usize>,
    params: PeakPickingParams,
    json: bool,
) -> Result<()> {
    let mut file = settings.open(raw, true, params)?;
    let mode = IonTraceMode::from(mode);

    let spectrum = match at {
        At::Time(time) => file.get_mass_spectrum(time, &mode, average)?,
        At::Peak(index) => file.get_peak_mass_spectrum(&mode, index, average)?,
    };

    if json {
        return print_json(&spectrum);
    }

    let mut points: Vec<MassPeak> = spectrum.iter().collect();
    if let Some(n) = top {
        points.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        points.truncate(n);
        points.sort_by(|a, b| a.mass.total_cmp(&b.mass));
    }

    println!(
        "# {} spectrum, {} points, TIC {:.1}",
        spectrum.mode,
        spectrum.len(),
        spectrum.total_ion_current()
    );
    if let Some(bp) = spectrum.base_peak() {
        println!("# base peak m/z {:.4} ({:.1})", bp.mass, bp.intensity);
    }
    println!("{:>12}  {:>14}", "mz", "intensity");
    for p in points {
        println!("{:>12.4}  {:>14.2}", p.mass, p.intensity);
    }

    Ok(())
}
