//! # bruker2mrd
//!
//! Command-line tool for inspecting and converting Bruker ParaVision raw data.
//!
//! ## Usage
//!
//! ```bash
//! # Re-render a parameter file
//! bruker2mrd params study/5/acqp
//!
//! # List the generated records of a scan
//! bruker2mrd profiles study/5
//!
//! # Convert a scan to JSON lines acquisitions
//! bruker2mrd convert study/5 scan5.jsonl
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
