//! TOML configuration file support.
//!
//! Dataset file names and the conversion policy can be kept in a config file
//! instead of repeating CLI flags:
//!
//! ```toml
//! # bruker2mrd.toml
//! [dataset]
//! acqp = "acqp"
//! method = "method"
//! fid = "fid"
//!
//! [conversion]
//! use_method = true
//! skip_short_reads = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use bruker2mrd::dataset::{ConversionConfig, DatasetLayout};

/// Root configuration structure for bruker2mrd.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// File names inside the scan directory.
    #[serde(default)]
    pub dataset: DatasetSection,

    /// Conversion policy.
    #[serde(default)]
    pub conversion: ConversionSection,
}

/// `[dataset]` table.
#[derive(Debug, Default, Deserialize)]
pub struct DatasetSection {
    /// Acquisition parameter file name.
    pub acqp: Option<String>,

    /// Protocol parameter file name.
    pub method: Option<String>,

    /// Raw data file name.
    pub fid: Option<String>,

    /// Subject file name in the study directory.
    pub subject: Option<String>,
}

/// `[conversion]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionSection {
    /// Take encode order from the method file.
    pub use_method: Option<bool>,

    /// Skip short records instead of failing.
    pub skip_short_reads: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Dataset file names, defaults filled in.
    pub fn layout(&self) -> DatasetLayout {
        let mut layout = DatasetLayout::default();
        let section = &self.dataset;
        if let Some(acqp) = &section.acqp {
            layout.acqp = acqp.clone();
        }
        if let Some(method) = &section.method {
            layout.method = method.clone();
        }
        if let Some(fid) = &section.fid {
            layout.fid = fid.clone();
        }
        if let Some(subject) = &section.subject {
            layout.subject = subject.clone();
        }
        layout
    }

    /// Conversion policy with CLI flags applied on top of the file values.
    pub fn conversion_config(&self, no_method: bool, skip_short_reads: bool) -> ConversionConfig {
        let defaults = ConversionConfig::default();
        ConversionConfig {
            use_method: !no_method
                && self.conversion.use_method.unwrap_or(defaults.use_method),
            skip_short_reads: skip_short_reads
                || self
                    .conversion
                    .skip_short_reads
                    .unwrap_or(defaults.skip_short_reads),
        }
    }
}
