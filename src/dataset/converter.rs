use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use super::acquisition::{Acquisition, EncodingSummary};
use super::bruker::BrukerDataset;
use super::error::DatasetError;
use super::sink::AcquisitionSink;
use crate::raw::{record_stride, DataFormat, RawDataError};

/// Conversion policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Take encode order from the method file when there is one
    pub use_method: bool,
    /// Skip records cut short by the end of the raw data file instead of failing
    pub skip_short_reads: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            use_method: true,
            skip_short_reads: false,
        }
    }
}

/// Statistics from a completed conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionStats {
    /// Records generated from the parameters
    pub profiles: usize,
    /// Acquisitions handed to the sink
    pub acquisitions_written: usize,
    /// Records skipped after a short read
    pub skipped: usize,
    /// Largest sample magnitude seen
    pub max_data_value: f32,
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conversion: {} profiles, {} acquisitions written, {} skipped, max |sample| {}",
            self.profiles, self.acquisitions_written, self.skipped, self.max_data_value
        )
    }
}

/// Statistics from a completed re-encode
#[derive(Debug, Clone, PartialEq)]
pub struct RequantizeStats {
    /// Records re-encoded
    pub profiles: usize,
    /// Reference maximum used for integer scaling
    pub reference_max: f32,
    /// Encoding of the written file
    pub format: DataFormat,
    /// Size of the written file in bytes
    pub bytes_written: u64,
}

/// Streams a dataset's records through an [`AcquisitionSink`]
#[derive(Debug, Clone, Default)]
pub struct DatasetConverter {
    config: ConversionConfig,
}

impl DatasetConverter {
    /// Create a converter with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with a custom policy
    pub fn with_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Current policy
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Decode every record of `dataset` and hand it to `sink` in acquisition order
    pub fn convert<S: AcquisitionSink>(
        &self,
        dataset: &BrukerDataset,
        sink: &mut S,
    ) -> Result<ConversionStats, DatasetError> {
        let (generator, profiles) = dataset.profiles(self.config.use_method)?;
        if generator.parameters().data_format == DataFormat::None {
            return Err(RawDataError::NoFormat.into());
        }

        let summary = EncodingSummary::new(dataset, &generator, profiles.len());
        info!("Encoding: {}", summary);
        sink.write_header(&summary)?;

        let mut stats = ConversionStats {
            profiles: profiles.len(),
            ..Default::default()
        };
        let mut fid = BufReader::new(File::open(dataset.fid_path())?);

        for (counter, mut profile) in profiles.into_iter().enumerate() {
            match profile.read(&mut fid) {
                Ok(()) => {}
                Err(RawDataError::ShortRead { expected, actual }) if self.config.skip_short_reads => {
                    warn!(
                        "Skipping profile {} at offset {}: read {} of {} bytes",
                        counter, profile.file_position, actual, expected
                    );
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
            stats.max_data_value = stats.max_data_value.max(profile.max_data_value());
            let acquisition = Acquisition::from_profile(&profile, counter as u64, &summary)?;
            sink.append(&acquisition)?;
            stats.acquisitions_written += 1;
        }

        sink.finish()?;
        info!("{}", stats);
        Ok(stats)
    }
}

/// Re-encode the raw data of `dataset` in `format`, writing to `destination`.
///
/// The reference maximum for integer scaling is the largest sample magnitude
/// over the whole file. Output is assembled in a temporary file beside the
/// destination and moved into place only once complete.
pub fn requantize<P: AsRef<Path>>(
    dataset: &BrukerDataset,
    format: DataFormat,
    destination: P,
    use_method: bool,
) -> Result<RequantizeStats, DatasetError> {
    let destination = destination.as_ref();
    if format == DataFormat::None {
        return Err(RawDataError::NoFormat.into());
    }
    let (generator, mut profiles) = dataset.profiles(use_method)?;
    if generator.parameters().data_format == DataFormat::None {
        return Err(RawDataError::NoFormat.into());
    }

    let mut fid = BufReader::new(File::open(dataset.fid_path())?);
    let mut reference_max = 0.0f32;
    for profile in profiles.iter_mut() {
        profile.read(&mut fid)?;
        reference_max = reference_max.max(profile.max_data_value());
        profile.clear_samples();
    }
    debug!("Reference maximum for requantization: {}", reference_max);

    let parameters = generator.parameters();
    let readout = parameters.size.first().copied().unwrap_or(0);
    let stride = record_stride(
        format,
        readout,
        parameters.channel_count,
        parameters.block_format,
    )? as u64;
    let total = stride
        .checked_mul(profiles.len() as u64)
        .ok_or_else(|| RawDataError::InvalidParameter {
            name: "ACQ_size".to_string(),
            reason: format!("{} records of {} bytes overflow the file offset", profiles.len(), stride),
        })?;

    let directory = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory)?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        for (index, profile) in profiles.iter_mut().enumerate() {
            profile.read(&mut fid)?;
            profile.data_format = format;
            profile.file_position = stride * index as u64;
            profile.write(&mut out, reference_max)?;
            profile.clear_samples();
        }
        out.flush()?;
    }
    temp.as_file().set_len(total)?;
    temp.persist(destination)?;

    info!(
        "Wrote {} profiles as {} to {}",
        profiles.len(),
        format.label(),
        destination.display()
    );
    Ok(RequantizeStats {
        profiles: profiles.len(),
        reference_max,
        format,
        bytes_written: total,
    })
}
