use anyhow::{Context, Result};
use std::path::PathBuf;

use bruker2mrd::dataset::BrukerDataset;

use super::Config;

/// Print the generated record list of a scan
pub fn run(dataset: PathBuf, config: Config, no_method: bool, limit: Option<usize>) -> Result<()> {
    let scan = BrukerDataset::open_with_layout(&dataset, &config.layout())
        .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;
    let policy = config.conversion_config(no_method, false);
    let (generator, profiles) = scan
        .profiles(policy.use_method)
        .context("Failed to generate the profile list")?;

    println!(
        "{:>8} {:>12} {:>6} {:>6} {:>6} {:>5} {:>4}",
        "record", "offset", "ky", "kz", "slice", "echo", "rep"
    );
    let shown = limit.unwrap_or(profiles.len());
    for (index, profile) in profiles.iter().take(shown).enumerate() {
        println!(
            "{:>8} {:>12} {:>6} {:>6} {:>6} {:>5} {:>4}",
            index,
            profile.file_position,
            profile.encode_step_1,
            profile.encode_step_2,
            profile.slice_no,
            profile.echo_no,
            profile.repetition_no
        );
    }
    if shown < profiles.len() {
        println!("... {} more", profiles.len() - shown);
    }

    println!();
    println!(
        "{} records, {} bytes each, {} channel(s)",
        profiles.len(),
        generator.profile_data_length()?,
        generator.channel_count()
    );
    Ok(())
}
