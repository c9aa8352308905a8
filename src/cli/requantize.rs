use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use bruker2mrd::dataset::{requantize, BrukerDataset};
use bruker2mrd::raw::DataFormat;

use super::Config;

/// Re-encode the fid of a scan in another sample format
pub fn run(
    dataset: PathBuf,
    output: PathBuf,
    format: DataFormat,
    config: Config,
    no_method: bool,
) -> Result<()> {
    let scan = BrukerDataset::open_with_layout(&dataset, &config.layout())
        .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;
    if output == scan.fid_path() {
        anyhow::bail!("Refusing to overwrite the source fid {}", output.display());
    }

    let policy = config.conversion_config(no_method, false);
    let stats = requantize(&scan, format, &output, policy.use_method)
        .with_context(|| format!("Failed to re-encode {}", scan.fid_path().display()))?;

    info!("Re-encoded {} profiles as {}", stats.profiles, stats.format.label());
    info!("  Reference maximum: {}", stats.reference_max);
    info!("  Bytes written: {}", stats.bytes_written);
    Ok(())
}
