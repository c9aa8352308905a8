use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use bruker2mrd::dataset::{BrukerDataset, DatasetConverter, JsonLinesSink};

use super::Config;

/// Convert a scan directory to JSON lines acquisitions
pub fn run(
    dataset: PathBuf,
    output: Option<PathBuf>,
    config: Config,
    no_method: bool,
    skip_short_reads: bool,
) -> Result<()> {
    if !dataset.is_dir() {
        anyhow::bail!("Dataset directory does not exist: {}", dataset.display());
    }

    // Default: study/5 -> study/5.jsonl
    let output = output.unwrap_or_else(|| dataset.with_extension("jsonl"));

    let policy = config.conversion_config(no_method, skip_short_reads);
    info!("bruker2mrd - ParaVision to acquisitions");
    info!("=======================================");
    info!("Input:  {}", dataset.display());
    info!("Output: {}", output.display());
    info!("Encode order from method: {}", policy.use_method);
    info!("Skip short reads: {}", policy.skip_short_reads);

    let scan = BrukerDataset::open_with_layout(&dataset, &config.layout())
        .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;
    let mut sink = JsonLinesSink::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let stats = DatasetConverter::with_config(policy)
        .convert(&scan, &mut sink)
        .context("Conversion failed")?;

    info!("Conversion complete!");
    info!("  Profiles generated: {}", stats.profiles);
    info!("  Acquisitions written: {}", stats.acquisitions_written);
    if stats.skipped > 0 {
        info!("  Skipped short records: {}", stats.skipped);
    }
    let file_size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    info!(
        "  Output file size: {} bytes ({:.2} MB)",
        file_size,
        file_size as f64 / 1024.0 / 1024.0
    );

    Ok(())
}
