use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use bruker2mrd::raw::DataFormat;

mod config;
mod convert;
mod info;
mod params;
mod profiles;
mod requantize;

pub use config::Config;

/// bruker2mrd - Bruker ParaVision raw data converter
#[derive(Parser)]
#[command(name = "bruker2mrd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Sample encoding for re-encoded raw data.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// 16-bit signed integers
    Int16,
    /// 32-bit signed integers
    Int32,
    /// 32-bit floats
    Float32,
}

impl From<FormatArg> for DataFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Int16 => DataFormat::Int16,
            FormatArg::Int32 => DataFormat::Int32,
            FormatArg::Float32 => DataFormat::Float32,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a parameter file and print it back as text
    Params {
        /// Parameter file path (acqp, method, subject, ...)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print only the named parameter
        #[arg(short, long)]
        name: Option<String>,

        /// Write the rendered document to a file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// List the generated records of a scan in acquisition order
    Profiles {
        /// Scan directory holding acqp and fid
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Derive encode order from acqp even when a method file exists
        #[arg(long)]
        no_method: bool,

        /// Print at most this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Display acquisition information about a scan
    Info {
        /// Scan directory holding acqp and fid
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Derive encode order from acqp even when a method file exists
        #[arg(long)]
        no_method: bool,
    },

    /// Convert a scan to JSON lines acquisitions
    Convert {
        /// Scan directory holding acqp and fid
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Output file path (defaults to <DATASET>.jsonl)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Derive encode order from acqp even when a method file exists
        #[arg(long)]
        no_method: bool,

        /// Skip records cut short by the end of the fid instead of failing
        #[arg(long)]
        skip_short_reads: bool,
    },

    /// Re-encode the raw data of a scan in another sample format
    Requantize {
        /// Scan directory holding acqp and fid
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Output raw data file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Target sample format
        #[arg(short, long, default_value = "int16", value_enum)]
        format: FormatArg,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Derive encode order from acqp even when a method file exists
        #[arg(long)]
        no_method: bool,
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

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(&path),
        None => Ok(Config::default()),
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Params { file, name, output } => params::run(file, name, output),
        Commands::Profiles {
            dataset,
            config,
            no_method,
            limit,
        } => profiles::run(dataset, load_config(config)?, no_method, limit),
        Commands::Info {
            dataset,
            config,
            no_method,
        } => info::run(dataset, load_config(config)?, no_method),
        Commands::Convert {
            dataset,
            output,
            config,
            no_method,
            skip_short_reads,
        } => convert::run(
            dataset,
            output,
            load_config(config)?,
            no_method,
            skip_short_reads,
        ),
        Commands::Requantize {
            dataset,
            output,
            format,
            config,
            no_method,
        } => requantize::run(
            dataset,
            output,
            DataFormat::from(format),
            load_config(config)?,
            no_method,
        ),
    }
}
