use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use lcms_parser::traces::PeakPickingParams;

mod check;
mod config;
#[cfg(feature = "masslynx")]
mod info;
#[cfg(feature = "masslynx")]
mod peaks;
#[cfg(feature = "masslynx")]
mod spectrum;
#[cfg(feature = "masslynx")]
mod trace;

pub use config::Config;

/// lcms-parser - Waters UPLC-MS raw file toolkit
#[derive(Parser)]
#[command(name = "lcms-parser")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// MassLynx license key (default: license.key in the working directory)
    #[arg(long, global = true)]
    license_key: Option<String>,

    /// Directory containing license.key
    #[arg(long, global = true, value_name = "DIR")]
    license_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Peak picking overrides shared by the commands that pick peaks.
#[derive(Args, Clone, Debug, Default)]
pub struct PeakArgs {
    /// Solvent front in minutes; earlier points are ignored
    #[arg(long)]
    solvent_front: Option<f64>,

    /// End of the run in minutes; later points are ignored
    #[arg(long)]
    run_end: Option<f64>,

    /// Relative height (fraction of prominence) for width and integral
    #[arg(long)]
    rel_height: Option<f64>,

    /// Report absolute integrals instead of area fractions
    #[arg(long)]
    unscaled: bool,

    /// Minimum peak height
    #[arg(long)]
    min_height: Option<f64>,

    /// Minimum peak prominence
    #[arg(long)]
    min_prominence: Option<f64>,
}

impl PeakArgs {
    /// Apply the flags on top of `base` (usually the `[peaks]` config table).
    pub fn apply(&self, mut base: PeakPickingParams) -> PeakPickingParams {
        if let Some(v) = self.solvent_front {
            base.solvent_front = v;
        }
        if let Some(v) = self.run_end {
            base.run_end = v;
        }
        if let Some(v) = self.rel_height {
            base.rel_height = v;
        }
        if self.unscaled {
            base.scale_integrals = false;
        }
        if self.min_height.is_some() {
            base.detection.min_height = self.min_height;
        }
        if self.min_prominence.is_some() {
            base.detection.min_prominence = self.min_prominence;
        }
        base
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a raw directory can be opened (license, layout, SDK)
    Check {
        /// Raw directory path
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ion modes, scan counts and analog channels
    #[cfg(feature = "masslynx")]
    Info {
        /// Raw directory path
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the TIC trace of an ion mode
    #[cfg(feature = "masslynx")]
    Trace {
        /// Raw directory path
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Ion mode, e.g. ES+
        #[arg(short, long, default_value = "ES+")]
        mode: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print an analog (UV/DAD) trace
    #[cfg(feature = "masslynx")]
    Analog {
        /// Raw directory path
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Analog channel id
        #[arg(short, long, default_value = "0")]
        channel: usize,

        /// Keep raw absorbance values instead of scaling to 1.0
        #[arg(long)]
        no_scale: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick peaks on a TIC or analog trace
    #[cfg(feature = "masslynx")]
    Peaks {
        /// Raw directory path
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Ion mode of the TIC trace
        #[arg(short, long, conflicts_with = "channel")]
        mode: Option<String>,

        /// Analog channel id instead of a TIC trace
        #[arg(short, long)]
        channel: Option<usize>,

        #[command(flatten)]
        peak_args: PeakArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a (averaged) mass spectrum at a time or TIC peak
    #[cfg(feature = "masslynx")]
    Spectrum {
        /// Raw directory path
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Ion mode
        #[arg(short, long, default_value = "ES+")]
        mode: String,

        /// Retention time in minutes
        #[arg(short, long, conflicts_with = "peak", required_unless_present = "peak")]
        time: Option<f64>,

        /// Index of a TIC peak instead of a time
        #[arg(short, long)]
        peak: Option<usize>,

        /// Number of neighbouring scans on each side to average
        #[arg(short, long, default_value = "0")]
        average: usize,

        /// Only print the N most intense points
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        #[command(flatten)]
        peak_args: PeakArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Verbosity level from `-v` flags
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Settings shared by all commands, merged from the config file and global flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub license_key: Option<String>,
    pub license_dir: Option<PathBuf>,
    pub peaks: PeakPickingParams,
}

impl Settings {
    fn new(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(Self {
            license_key: cli.license_key.clone().or(config.license.key),
            license_dir: cli.license_dir.clone().or(config.license.dir),
            peaks: config.peaks,
        })
    }

    /// Open `raw` with these settings
    #[cfg(feature = "masslynx")]
    pub fn open(
        &self,
        raw: &std::path::Path,
        scale_analog: bool,
        peaks: PeakPickingParams,
    ) -> Result<lcms_parser::WatersRawFile> {
        let mut options = lcms_parser::waters::OpenOptions::new()
            .scale_analog(scale_analog)
            .peak_params(peaks);
        if let Some(key) = &self.license_key {
            options = options.license_key(key);
        }
        if let Some(dir) = &self.license_dir {
            options = options.license_dir(dir);
        }
        options
            .open(raw)
            .with_context(|| format!("Failed to open {}", raw.display()))
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let settings = Settings::new(&cli)?;

    match cli.command {
        Commands::Check { raw, json } => check::run(&settings, &raw, json),
        #[cfg(feature = "masslynx")]
        Commands::Info { raw, json } => info::run(&settings, &raw, json),
        #[cfg(feature = "masslynx")]
        Commands::Trace { raw, mode, json } => trace::run_tic(&settings, &raw, &mode, json),
        #[cfg(feature = "masslynx")]
        Commands::Analog {
            raw,
            channel,
            no_scale,
            json,
        } => trace::run_analog(&settings, &raw, channel, !no_scale, json),
        #[cfg(feature = "masslynx")]
        Commands::Peaks {
            raw,
            mode,
            channel,
            peak_args,
            json,
        } => {
            let params = peak_args.apply(settings.peaks.clone());
            let target = match channel {
                Some(channel) => peaks::Target::Analog(channel),
                None => peaks::Target::Tic(mode.unwrap_or_else(|| "ES+".to_string())),
            };
            peaks::run(&settings, &raw, target, &params, json)
        }
        #[cfg(feature = "masslynx")]
        Commands::Spectrum {
            raw,
            mode,
            time,
            peak,
            average,
            top,
            peak_args,
            json,
        } => {
            let params = peak_args.apply(settings.peaks.clone());
            let at = match (time, peak) {
                (_, Some(index)) => spectrum::At::Peak(index),
                (Some(time), None) => spectrum::At::Time(time),
                (None, None) => anyhow::bail!("Either --time or --peak is required"),
            };
            spectrum::run(&settings, &raw, &mode, at, average, top, params, json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PeakPickingParams {
        Config::from_str(
            r#"
            [peaks]
            solvent_front = 0.5
            run_end = 4.5
            rel_height = 0.9
            min_prominence = 0.2
            distance = 3
            "#,
        )
        .unwrap()
        .peaks
    }

    #[test]
    fn test_unset_flags_keep_config_values() {
        let params = PeakArgs::default().apply(configured());
        assert_eq!(params, configured());
    }

    #[test]
    fn test_flags_override_config_values() {
        let args = PeakArgs {
            run_end: Some(6.0),
            unscaled: true,
            min_prominence: Some(0.05),
            min_height: Some(100.0),
            ..PeakArgs::default()
        };
        let params = args.apply(configured());

        assert_eq!(params.run_end, 6.0);
        assert!(!params.scale_integrals);
        assert_eq!(params.detection.min_prominence, Some(0.05));
        assert_eq!(params.detection.min_height, Some(100.0));
        // Not given on the command line
        assert_eq!(params.solvent_front, 0.5);
        assert_eq!(params.rel_height, 0.9);
        assert_eq!(params.detection.distance, Some(3));
    }
}
