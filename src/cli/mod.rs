use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use mzdb::store::{MzdbStore, ParamTreeScope};

mod bbox;
mod chromatogram;
mod config;
mod info;
mod iterate;
mod param_tree;
mod spectrum;

use config::Config;

/// mzdb - Inspect mzDB mass spectrometry files
#[derive(Parser)]
#[command(name = "mzdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Load store settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which record a param tree is read from.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScopeArg {
    /// Container-level tree
    Mzdb,
    /// Spectrum (falls back to its shared tree)
    Spectrum,
    /// Chromatogram
    Chromatogram,
    /// Run
    Run,
}

#[derive(Subcommand)]
enum Commands {
    /// Display a summary of an mzDB file
    Info {
        /// Input mzDB file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the header and peaks of one spectrum
    Spectrum {
        /// Input mzDB file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Spectrum id
        #[arg(value_name = "ID")]
        id: i64,

        /// Only peaks in this m/z window
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        mz: Option<Vec<f64>>,

        /// Print at most this many peaks
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the header as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one bounding box, or the boxes intersecting a region
    Bbox {
        /// Input mzDB file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Bounding box id
        #[arg(long, conflicts_with_all = ["mz", "time"])]
        id: Option<i64>,

        /// m/z window of the region
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        mz: Option<Vec<f64>>,

        /// Retention time window of the region (seconds)
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        time: Option<Vec<f64>>,

        /// MS level of the region
        #[arg(long, default_value = "1")]
        ms_level: u8,
    },

    /// List chromatograms, or print the points of one
    Chromatogram {
        /// Input mzDB file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Chromatogram id
        #[arg(value_name = "ID")]
        id: Option<i64>,

        /// Print at most this many points
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print a param tree
    ParamTree {
        /// Input mzDB file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Record the tree belongs to
        #[arg(value_enum, default_value = "mzdb")]
        scope: ScopeArg,

        /// Record id (required for every scope but mzdb)
        #[arg(value_name = "ID")]
        id: Option<i64>,
    },

    /// Decode every spectrum and print one line per spectrum
    Iterate {
        /// Input mzDB file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Restrict to one MS level
        #[arg(long)]
        ms_level: Option<u8>,

        /// Stop after this many spectra
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
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
    let config = cli.config;
    match cli.command {
        Commands::Info { file } => info::run(&open_store(&file, config.as_deref())?),
        Commands::Spectrum {
            file,
            id,
            mz,
            limit,
            json,
        } => spectrum::run(
            &open_store(&file, config.as_deref())?,
            id,
            window(mz),
            limit,
            json,
        ),
        Commands::Bbox {
            file,
            id,
            mz,
            time,
            ms_level,
        } => bbox::run(
            &open_store(&file, config.as_deref())?,
            id,
            window(mz),
            window(time),
            ms_level,
        ),
        Commands::Chromatogram { file, id, limit } => {
            chromatogram::run(&open_store(&file, config.as_deref())?, id, limit)
        }
        Commands::ParamTree { file, scope, id } => {
            let scope = param_tree_scope(scope, id)?;
            param_tree::run(&open_store(&file, config.as_deref())?, scope)
        }
        Commands::Iterate {
            file,
            ms_level,
            limit,
        } => iterate::run(&open_store(&file, config.as_deref())?, ms_level, limit),
    }
}

fn open_store(file: &Path, config: Option<&Path>) -> Result<MzdbStore> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }
    let store_config = match config {
        Some(path) => Config::from_file(path)?.store,
        None => Default::default(),
    };
    MzdbStore::open_with_config(file, store_config)
        .with_context(|| format!("Failed to open {}", file.display()))
}

/// clap guarantees exactly two values for `num_args = 2`
fn window(values: Option<Vec<f64>>) -> Option<(f64, f64)> {
    match values.as_deref() {
        Some(&[min, max]) => Some((min, max)),
        _ => None,
    }
}

fn param_tree_scope(scope: ScopeArg, id: Option<i64>) -> Result<ParamTreeScope> {
    let require_id = || id.context("This scope needs a record id");
    Ok(match scope {
        ScopeArg::Mzdb => ParamTreeScope::Mzdb,
        ScopeArg::Spectrum => ParamTreeScope::Spectrum(require_id()?),
        ScopeArg::Chromatogram => ParamTreeScope::Chromatogram(require_id()?),
        ScopeArg::Run => ParamTreeScope::Run(require_id()?),
    })
}
