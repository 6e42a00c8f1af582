//! # mzdb
//!
//! A command-line tool for inspecting mzDB mass spectrometry files.
//!
//! ## Usage
//!
//! ```bash
//! # File summary
//! mzdb info run.mzDB
//!
//! # Peaks of spectrum 42 between m/z 400 and 410
//! mzdb spectrum run.mzDB 42 --mz 400 410
//!
//! # Bounding boxes of an MS1 region
//! mzdb bbox run.mzDB --mz 400 410 --time 60 120
//!
//! # Param tree of a spectrum
//! mzdb param-tree run.mzDB spectrum 42
//!
//! # Decode all MS2 spectra
//! mzdb -v iterate run.mzDB --ms-level 2
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
