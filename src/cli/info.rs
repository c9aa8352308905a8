use anyhow::{Context, Result};
use std::path::PathBuf;

#[cfg(feature = "colorized_output")]
use console::style;

use bruker2mrd::dataset::{BrukerDataset, EncodingSummary};

use super::Config;

struct Report {
    rows: Vec<(&'static str, String)>,
    expected_bytes: u64,
    actual_bytes: u64,
}

impl Report {
    fn truncated(&self) -> bool {
        self.actual_bytes < self.expected_bytes
    }

    #[cfg(feature = "colorized_output")]
    fn render(&self, title: &str) -> String {
        use console::Emoji;

        static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
        static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");

        let mut output = String::new();
        output.push_str(&format!("{}\n", style(title).bold().cyan()));
        output.push_str(&format!("{}\n", style("=".repeat(title.len())).cyan()));
        for (key, value) in &self.rows {
            output.push_str(&format!("  {:<18} {}\n", style(key).bold(), value));
        }
        output.push('\n');
        if self.truncated() {
            output.push_str(&format!(
                "[{}] {}: fid holds {} of {} bytes\n",
                WARN,
                style("TRUNCATED").yellow().bold(),
                self.actual_bytes,
                self.expected_bytes
            ));
        } else {
            output.push_str(&format!(
                "[{}] {}\n",
                OK,
                style(format!("fid holds all {} bytes", self.expected_bytes)).green()
            ));
        }
        output
    }

    #[cfg(not(feature = "colorized_output"))]
    fn render(&self, title: &str) -> String {
        let mut output = format!("{}\n{}\n", title, "=".repeat(title.len()));
        for (key, value) in &self.rows {
            output.push_str(&format!("  {:<18} {}\n", key, value));
        }
        output.push('\n');
        if self.truncated() {
            output.push_str(&format!(
                "[WARN] TRUNCATED: fid holds {} of {} bytes\n",
                self.actual_bytes, self.expected_bytes
            ));
        } else {
            output.push_str(&format!("[OK] fid holds all {} bytes\n", self.expected_bytes));
        }
        output
    }
}

/// Display acquisition information about a scan
pub fn run(dataset: PathBuf, config: Config, no_method: bool) -> Result<()> {
    let scan = BrukerDataset::open_with_layout(&dataset, &config.layout())
        .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;
    let policy = config.conversion_config(no_method, false);
    let (generator, profiles) = scan
        .profiles(policy.use_method)
        .context("Failed to generate the profile list")?;
    let summary = EncodingSummary::new(&scan, &generator, profiles.len());
    let parameters = generator.parameters();

    let actual_bytes = std::fs::metadata(scan.fid_path())
        .with_context(|| format!("Failed to stat {}", scan.fid_path().display()))?
        .len();
    let stride = generator.profile_data_length()?;
    let expected_bytes = (stride as u64).saturating_mul(profiles.len() as u64);

    let [x, y, z] = summary.matrix_size;
    let mut rows = vec![
        ("Dataset", scan.root().display().to_string()),
        ("Method file", scan.method().is_some().to_string()),
        ("Sample format", summary.source_format.clone()),
        ("Byte order", format!("{:?}", parameters.endianness)),
        ("Block format", parameters.block_format.to_string()),
        ("Matrix", format!("{} x {} x {}", x, y, z)),
        ("Channels", summary.receiver_channels.to_string()),
        ("Slices", summary.slices.to_string()),
        ("Echoes", summary.contrasts.to_string()),
        ("Repetitions", summary.repetitions.to_string()),
        ("RARE factor", generator.rare_factor().to_string()),
        (
            "ky range",
            format!("{} .. {}", summary.encode_step_1_range[0], summary.encode_step_1_range[1]),
        ),
        (
            "kz range",
            format!("{} .. {}", summary.encode_step_2_range[0], summary.encode_step_2_range[1]),
        ),
        ("Records", profiles.len().to_string()),
        ("Record stride", format!("{} bytes", stride)),
    ];
    if let Some(width) = summary.spectral_width_hz {
        rows.push(("Spectral width", format!("{} Hz", width)));
    }
    if let Some(name) = summary.subject.as_ref().and_then(|s| s.name.clone()) {
        rows.push(("Subject", name));
    }

    let report = Report {
        rows,
        expected_bytes,
        actual_bytes,
    };
    print!("{}", report.render("ParaVision Scan Information"));
    Ok(())
}
