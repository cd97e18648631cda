use anyhow::Result;
use log::info;
use std::path::Path;

use lcms_parser::waters::check_raw_file;

use super::{print_json, Settings};

/// Check that a raw directory can be opened
pub fn run(settings: &Settings, raw: &Path, json: bool) -> Result<()> {
    info!("Checking {}", raw.display());

    #[cfg(feature = "masslynx")]
    let sdk = lcms_parser::waters::native::NativeSdk::load();
    #[cfg(feature = "masslynx")]
    let sdk = match &sdk {
        Ok(sdk) => Ok(sdk as &dyn lcms_parser::waters::MassLynxSdk),
        Err(e) => Err(e.to_string()),
    };
    #[cfg(not(feature = "masslynx"))]
    let sdk = Err("built without the masslynx feature".to_string());

    let report = check_raw_file(
        sdk,
        raw,
        settings.license_key.as_deref(),
        settings.license_dir.as_deref(),
    );

    if json {
        print_json(&report)?;
    } else {
        #[cfg(feature = "colorized_output")]
        {
            println!("{}", report.format_colored());
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            println!("{}", report);
        }
    }

    // Exit with error code if a check failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
