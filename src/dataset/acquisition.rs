//! Records as handed to a raw-data container writer.
//!
//! The layout follows the ISMRMRD acquisition model: a header describing the
//! encoded space once, then one acquisition per k-space line with shifted
//! (non-negative for a centred scan) encode indices and loop-boundary flags.

use std::fmt;
use std::ops::BitOr;

use serde::Serialize;

use super::bruker::BrukerDataset;
use crate::parameters::ParameterFile;
use crate::raw::{ProfileListGenerator, RawDataError, RawProfile};

/// Loop-boundary markers, numbered as in the ISMRMRD acquisition header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AcquisitionFlags(u64);

impl AcquisitionFlags {
    /// First line along encode step 1
    pub const FIRST_IN_ENCODE_STEP1: Self = Self::bit(1);
    /// Last line along encode step 1
    pub const LAST_IN_ENCODE_STEP1: Self = Self::bit(2);
    /// First line of a slice
    pub const FIRST_IN_SLICE: Self = Self::bit(7);
    /// Last line of a slice
    pub const LAST_IN_SLICE: Self = Self::bit(8);
    /// First line of a repetition
    pub const FIRST_IN_REPETITION: Self = Self::bit(13);
    /// Last line of a repetition
    pub const LAST_IN_REPETITION: Self = Self::bit(14);

    const fn bit(number: u32) -> Self {
        Self(1 << (number - 1))
    }

    /// No flags set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bit mask
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Whether every flag of `other` is set
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Set the flags of `other`
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for AcquisitionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Index range along one encoding axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EncodingLimit {
    /// Smallest index
    pub minimum: usize,
    /// Largest index
    pub maximum: usize,
    /// Index of the k-space centre
    pub center: usize,
}

impl EncodingLimit {
    /// Limits of a centred axis with `size` lines
    pub fn centred(size: usize) -> Self {
        Self {
            minimum: 0,
            maximum: size.saturating_sub(1),
            center: size / 2,
        }
    }
}

/// Subject identification from the study's `subject` file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SubjectInfo {
    /// `SUBJECT_name_string`
    pub name: Option<String>,
    /// `SUBJECT_study_name`
    pub study: Option<String>,
    /// `SUBJECT_study_instance_uid`
    pub study_instance_uid: Option<String>,
    /// `SUBJECT_position`
    pub position: Option<String>,
}

impl SubjectInfo {
    /// Read the identification fields present in `subject`
    pub fn from_parameters(subject: &ParameterFile) -> Self {
        let text = |name: &str| {
            subject
                .find(name)
                .and_then(|p| p.value(0))
                .map(|v| v.as_str().to_string())
        };
        Self {
            name: text("SUBJECT_name_string"),
            study: text("SUBJECT_study_name"),
            study_instance_uid: text("SUBJECT_study_instance_uid"),
            position: text("SUBJECT_position"),
        }
    }
}

/// Encoded-space description written once ahead of the acquisitions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingSummary {
    /// Encoded matrix `[x, y, z]`; unused axes are 1
    pub matrix_size: [usize; 3],
    /// Receive channels per acquisition
    pub receiver_channels: usize,
    /// Limits along encode step 1 after shifting
    pub kspace_encoding_step_1: EncodingLimit,
    /// Limits along encode step 2 after shifting
    pub kspace_encoding_step_2: EncodingLimit,
    /// Number of slices
    pub slices: usize,
    /// Number of echoes
    pub contrasts: usize,
    /// Number of repetitions
    pub repetitions: usize,
    /// Raw ky steps as generated, `[min, max]`
    pub encode_step_1_range: [i32; 2],
    /// Raw kz steps as generated, `[min, max]`
    pub encode_step_2_range: [i32; 2],
    /// Number of acquisitions that follow
    pub acquisition_count: usize,
    /// Sample format of the source file
    pub source_format: String,
    /// Spectral width in Hz (`SW_h`)
    pub spectral_width_hz: Option<f64>,
    /// Subject identification
    pub subject: Option<SubjectInfo>,
}

impl EncodingSummary {
    /// Describe the encoded space of a generated record list
    pub fn new(
        dataset: &BrukerDataset,
        generator: &ProfileListGenerator,
        acquisition_count: usize,
    ) -> Self {
        let size_ky = generator.dimension_size(1).max(1);
        let size_kz = generator.dimension_size(2).max(1);
        Self {
            matrix_size: [generator.dimension_size(0).max(1), size_ky, size_kz],
            receiver_channels: generator.channel_count(),
            kspace_encoding_step_1: EncodingLimit::centred(size_ky),
            kspace_encoding_step_2: EncodingLimit::centred(size_kz),
            slices: generator.slice_count(),
            contrasts: generator.echo_count(),
            repetitions: generator.repetition_count(),
            encode_step_1_range: [
                generator.encoding_step_1_min(),
                generator.encoding_step_1_max(),
            ],
            encode_step_2_range: [
                generator.encoding_step_2_min(),
                generator.encoding_step_2_max(),
            ],
            acquisition_count,
            source_format: generator.parameters().data_format.label().to_string(),
            spectral_width_hz: dataset
                .acqp()
                .find("SW_h")
                .and_then(|p| p.value(0))
                .map(|v| v.as_float()),
            subject: dataset.subject().map(SubjectInfo::from_parameters),
        }
    }

    /// Loop-boundary flags for a line with raw encode step `ky`
    pub fn flags_for(&self, ky: i32) -> AcquisitionFlags {
        let [min, max] = self.encode_step_1_range;
        let mut flags = AcquisitionFlags::empty();
        if ky == min {
            flags.insert(
                AcquisitionFlags::FIRST_IN_ENCODE_STEP1
                    | AcquisitionFlags::FIRST_IN_SLICE
                    | AcquisitionFlags::FIRST_IN_REPETITION,
            );
        }
        if ky == max {
            flags.insert(
                AcquisitionFlags::LAST_IN_ENCODE_STEP1
                    | AcquisitionFlags::LAST_IN_SLICE
                    | AcquisitionFlags::LAST_IN_REPETITION,
            );
        }
        flags
    }
}

impl fmt::Display for EncodingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.matrix_size;
        write!(
            f,
            "{}x{}x{} matrix, {} channel(s), {} slice(s), {} echo(es), {} repetition(s), {} acquisitions",
            x,
            y,
            z,
            self.receiver_channels,
            self.slices,
            self.contrasts,
            self.repetitions,
            self.acquisition_count
        )
    }
}

/// Loop indices of one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EncodingCounters {
    /// ky shifted by half the encoded matrix
    pub kspace_encode_step_1: i32,
    /// kz shifted by half the encoded matrix
    pub kspace_encode_step_2: i32,
    /// Slice
    pub slice: usize,
    /// Echo
    pub contrast: usize,
    /// Repetition
    pub repetition: usize,
}

fn centred_step(step: i32, matrix_size: usize) -> Result<i32, RawDataError> {
    i32::try_from(matrix_size / 2)
        .ok()
        .and_then(|half| step.checked_add(half))
        .ok_or_else(|| RawDataError::InvalidParameter {
            name: "PVM_Matrix".to_string(),
            reason: format!(
                "encode step {} shifted by half of {} is out of range",
                step, matrix_size
            ),
        })
}

/// One decoded k-space line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acquisition {
    /// Position in acquisition order
    pub scan_counter: u64,
    /// Loop-boundary markers
    pub flags: AcquisitionFlags,
    /// Complex samples per channel
    pub number_of_samples: usize,
    /// Receive channels
    pub active_channels: usize,
    /// Sample index of the echo centre
    pub center_sample: usize,
    /// Loop indices
    pub idx: EncodingCounters,
    /// `[re, im]` samples, channel after channel
    pub data: Vec<[f32; 2]>,
}

impl Acquisition {
    /// Build an acquisition from a record whose samples have been read.
    ///
    /// Fails when an encode step shifted by half the matrix leaves the `i32` range.
    pub fn from_profile(
        profile: &RawProfile,
        scan_counter: u64,
        summary: &EncodingSummary,
    ) -> Result<Self, RawDataError> {
        let kspace_encode_step_1 = centred_step(profile.encode_step_1, summary.matrix_size[1])?;
        let kspace_encode_step_2 = centred_step(profile.encode_step_2, summary.matrix_size[2])?;
        let data = profile
            .complex_samples()
            .map(|pairs| pairs.map(|(re, im)| [re, im]).collect())
            .unwrap_or_default();
        Ok(Self {
            scan_counter,
            flags: summary.flags_for(profile.encode_step_1),
            number_of_samples: profile.profile_length,
            active_channels: profile.channel_count.max(1),
            center_sample: profile.profile_length / 2,
            idx: EncodingCounters {
                kspace_encode_step_1,
                kspace_encode_step_2,
                slice: profile.slice_no,
                contrast: profile.echo_no,
                repetition: profile.repetition_no,
            },
            data,
        })
    }

    /// Samples of channel `channel`
    pub fn channel(&self, channel: usize) -> Option<&[[f32; 2]]> {
        let start = channel.checked_mul(self.number_of_samples)?;
        self.data.get(start..start + self.number_of_samples)
    }
}
