use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use super::{print_json, Settings};

#[derive(Serialize)]
struct FunctionInfo {
    mode: String,
    function: usize,
    scans: usize,
}

#[derive(Serialize)]
struct ChannelInfo {
    channel: usize,
    description: String,
}

#[derive(Serialize)]
struct RawInfo {
    path: String,
    license: String,
    functions: Vec<FunctionInfo>,
    analog_channels: Vec<ChannelInfo>,
}

/// Display ion modes and analog channels of a raw directory
pub fn run(settings: &Settings, raw: &Path, json: bool) -> Result<()> {
    let file = settings.open(raw, true, settings.peaks.clone())?;

    let mut functions = Vec::new();
    for (mode, function) in file.get_chromatogram_ids() {
        functions.push(FunctionInfo {
            mode: mode.to_string(),
            function: *function,
            scans: file.scan_count(mode)?,
        });
    }
    let analog_channels = file
        .get_analog_ids()?
        .into_iter()
        .map(|(channel, description)| ChannelInfo {
            channel,
            description,
        })
        .collect();

    let info = RawInfo {
        path: file.path().display().to_string(),
        license: file.license_source().to_string(),
        functions,
        analog_channels,
    };

    if json {
        return print_json(&info);
    }

    println!("Waters RAW Information");
    println!("======================");
    println!("Path: {}", info.path);
    println!("License: {}", info.license);
    println!();

    println!("MS Functions:");
    if info.functions.is_empty() {
        println!("  (none)");
    }
    for f in &info.functions {
        println!("  {:>6}  function {:>2}  {:>6} scans", f.mode, f.function, f.scans);
    }
    println!();

    println!("Analog Channels:");
    if info.analog_channels.is_empty() {
        println!("  (none)");
    }
    for c in &info.analog_channels {
        println!("  {:3}. {}", c.channel, c.description);
    }

    Ok(())
}
