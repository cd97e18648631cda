//! # lcms-parser
//!
//! Command-line access to Waters UPLC-MS raw directories.
//!
//! ## Usage
//!
//! ```bash
//! # Check license, directory layout and SDK
//! lcms-parser check sample.raw
//!
//! # List ion modes and analog channels
//! lcms-parser --license-key XXXXXX info sample.raw
//!
//! # Pick peaks on the UV trace and extract the spectrum under the first TIC peak
//! lcms-parser peaks sample.raw --channel 0
//! lcms-parser spectrum sample.raw --mode ES+ --peak 0 --average 2
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity
    cli::init_logging(cli.verbosity());

    cli::dispatch(cli)
}
