//! Acquisition-order generation of raw data records.
//!
//! The generator reads the acquisition document (`acqp`) and, when available,
//! the protocol document (`method`), then walks the scanner's loop structure
//! to produce one [`RawProfile`] per stored k-space line:
//!
//! ```text
//! repetition (NR)
//! └── kz step (ACQ_size[2], 3D only)
//!     └── ky block (ACQ_size[1] / ACQ_phase_factor, 2D and up)
//!         └── slice (ACQ_obj_order[0..NSLICES])
//!             └── phase within block (ACQ_phase_factor)
//!                 └── echo (ACQ_n_echo_images)
//! ```
//!
//! Records are emitted in file order with a fixed stride, so offsets increase
//! strictly along the list.

use std::fmt;

use log::debug;

use super::error::RawDataError;
use super::format::{DataFormat, Endianness};
use super::list::ProfileList;
use super::profile::RawProfile;
use crate::parameters::{Parameter, ParameterFile, Value};

/// Record alignment of the block file format
pub const BLOCK_SIZE: usize = 1024;

/// Record stride in bytes; block format rounds up to [`BLOCK_SIZE`].
///
/// `None` when the rounded length does not fit in `usize`.
pub fn padded_profile_length(raw_length: usize, block_format: bool) -> Option<usize> {
    if block_format {
        raw_length.div_ceil(BLOCK_SIZE).checked_mul(BLOCK_SIZE)
    } else {
        Some(raw_length)
    }
}

/// Encoded bytes of one record holding `readout` values per channel, before padding
pub fn raw_record_length(
    data_format: DataFormat,
    readout: usize,
    channel_count: usize,
) -> Result<usize, RawDataError> {
    data_format
        .element_size()
        .checked_mul(readout)
        .and_then(|n| n.checked_mul(channel_count.max(1)))
        .ok_or_else(|| oversized_record(readout))
}

/// Stride of records holding `readout` values per channel
pub fn record_stride(
    data_format: DataFormat,
    readout: usize,
    channel_count: usize,
    block_format: bool,
) -> Result<usize, RawDataError> {
    let raw_length = raw_record_length(data_format, readout, channel_count)?;
    padded_profile_length(raw_length, block_format).ok_or_else(|| oversized_record(readout))
}

fn oversized_record(readout: usize) -> RawDataError {
    RawDataError::InvalidParameter {
        name: "ACQ_size".to_string(),
        reason: format!("a readout of {} values overflows the record length", readout),
    }
}

/// Phase encode steps for one direction, in acquisition order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingOrder {
    /// Encode step of each acquired line
    pub steps: Vec<i32>,
    /// Smallest step, 0 for an empty table
    pub min: i32,
    /// Largest step, 0 for an empty table
    pub max: i32,
}

impl EncodingOrder {
    /// Wrap explicit steps, recording their range
    pub fn from_steps(steps: Vec<i32>) -> Self {
        let min = steps.iter().copied().min().unwrap_or(0);
        let max = steps.iter().copied().max().unwrap_or(0);
        Self { steps, min, max }
    }

    /// Rescale spatial phase values (`ACQ_spatial_phase_*`) to encode steps.
    ///
    /// Each value becomes `round(v / (max - min) * size)`; a table without
    /// spread maps every line to step 0.
    pub fn from_phase_table(phase: &[f64], size: usize) -> Self {
        let low = phase.iter().copied().fold(f64::INFINITY, f64::min);
        let high = phase.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = high - low;
        let steps = phase
            .iter()
            .map(|&v| {
                if span > 0.0 {
                    (v / span * size as f64).round() as i32
                } else {
                    0
                }
            })
            .collect();
        Self::from_steps(steps)
    }

    /// Whether the table holds no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Scalars and tables extracted from the parameter documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionParameters {
    /// `ACQ_dim`
    pub dim: usize,
    /// `ACQ_size`, one entry per dimension; `size[0]` counts real and imaginary parts
    pub size: Vec<usize>,
    /// `PVM_Matrix`, protocol only
    pub matrix: Option<Vec<i64>>,
    /// `PVM_AntiAlias`, protocol only
    pub anti_alias: Option<Vec<f64>>,
    /// `PVM_EncAvailReceivers`, 1 without a protocol
    pub channel_count: usize,
    /// `NI`
    pub object_count: usize,
    /// `ACQ_obj_order`
    pub object_order: Vec<usize>,
    /// `NSLICES`
    pub slice_count: usize,
    /// `ACQ_n_echo_images`
    pub echo_count: usize,
    /// `ACQ_phase_factor`
    pub phase_factor: usize,
    /// `ACQ_rare_factor`
    pub rare_factor: usize,
    /// `NR`
    pub repetition_count: usize,
    /// `ACQ_spatial_phase_1`, truncated to `ACQ_spatial_size_1`
    pub spatial_phase_1: Vec<f64>,
    /// `ACQ_spatial_phase_2`, truncated to `ACQ_spatial_size_2`
    pub spatial_phase_2: Vec<f64>,
    /// `GO_block_size == Standard_KBlock_Format`
    pub block_format: bool,
    /// `GO_raw_data_format`
    pub data_format: DataFormat,
    /// `BYTORDA`
    pub endianness: Endianness,
    /// Encode order along the first phase direction
    pub ky_order: EncodingOrder,
    /// Encode order along the second phase direction
    pub kz_order: EncodingOrder,
}

fn required<'a>(doc: &'a ParameterFile, name: &str) -> Result<&'a Parameter, RawDataError> {
    doc.find(name)
        .filter(|p| p.value(0).is_some())
        .ok_or_else(|| RawDataError::MissingRequiredParameter(name.to_string()))
}

fn to_count(name: &str, value: i64) -> Result<usize, RawDataError> {
    usize::try_from(value).map_err(|_| RawDataError::InvalidParameter {
        name: name.to_string(),
        reason: format!("expected a non-negative count, found {}", value),
    })
}

fn required_count(doc: &ParameterFile, name: &str) -> Result<usize, RawDataError> {
    let value = required(doc, name)?.value(0).map_or(0, |v| v.as_int());
    to_count(name, value)
}

fn optional_count(doc: &ParameterFile, name: &str) -> Result<Option<usize>, RawDataError> {
    match doc.find(name).and_then(|p| p.value(0)) {
        Some(v) => to_count(name, v.as_int()).map(Some),
        None => Ok(None),
    }
}

/// The first `expected` values of `parameter`, which must hold at least that many
fn leading_values<T>(
    parameter: &Parameter,
    expected: usize,
    project: impl Fn(&Value) -> T,
) -> Result<Vec<T>, RawDataError> {
    let values: Vec<T> = parameter.values().take(expected).map(project).collect();
    if values.len() != expected {
        return Err(RawDataError::DimensionMismatch {
            parameter: parameter.name().to_string(),
            expected,
            actual: parameter.values().count(),
        });
    }
    Ok(values)
}

/// All values of `parameter`, which must hold exactly `expected`
fn exact_values<T>(
    parameter: &Parameter,
    expected: usize,
    project: impl Fn(&Value) -> T,
) -> Result<Vec<T>, RawDataError> {
    let actual = parameter.values().count();
    if actual != expected {
        return Err(RawDataError::DimensionMismatch {
            parameter: parameter.name().to_string(),
            expected,
            actual,
        });
    }
    Ok(parameter.values().map(project).collect())
}

fn spatial_phase(
    acqp: &ParameterFile,
    size_name: &str,
    table_name: &str,
) -> Result<Vec<f64>, RawDataError> {
    let size = optional_count(acqp, size_name)?.unwrap_or(0);
    match acqp.find(table_name) {
        Some(table) if size > 0 => leading_values(table, size, |v| v.as_float()),
        _ => Ok(Vec::new()),
    }
}

fn step_table(protocol: &ParameterFile, name: &str) -> Result<EncodingOrder, RawDataError> {
    let Some(p) = protocol.find(name) else {
        return Ok(EncodingOrder::default());
    };
    let steps = p
        .values()
        .map(|v| {
            let step = v.as_int();
            i32::try_from(step).map_err(|_| RawDataError::InvalidParameter {
                name: name.to_string(),
                reason: format!("encode step {} is out of range", step),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EncodingOrder::from_steps(steps))
}

impl AcquisitionParameters {
    /// Extract generation inputs from `acqp` and an optional `method` document
    pub fn extract(
        acqp: &ParameterFile,
        protocol: Option<&ParameterFile>,
    ) -> Result<Self, RawDataError> {
        let dim = required_count(acqp, "ACQ_dim")?;
        if dim == 0 {
            return Err(RawDataError::InvalidParameter {
                name: "ACQ_dim".to_string(),
                reason: "acquisition has no dimensions".to_string(),
            });
        }
        let size = exact_values(required(acqp, "ACQ_size")?, dim, |v| v.as_int())?
            .into_iter()
            .map(|s| to_count("ACQ_size", s))
            .collect::<Result<Vec<_>, _>>()?;

        let object_count = required_count(acqp, "NI")?;
        let object_order = exact_values(required(acqp, "ACQ_obj_order")?, object_count, |v| {
            v.as_int()
        })?
        .into_iter()
        .map(|o| to_count("ACQ_obj_order", o))
        .collect::<Result<Vec<_>, _>>()?;

        let slice_count = required_count(acqp, "NSLICES")?;
        if slice_count > object_order.len() {
            return Err(RawDataError::DimensionMismatch {
                parameter: "ACQ_obj_order".to_string(),
                expected: slice_count,
                actual: object_order.len(),
            });
        }

        let phase_factor = required_count(acqp, "ACQ_phase_factor")?;
        if phase_factor == 0 {
            return Err(RawDataError::InvalidParameter {
                name: "ACQ_phase_factor".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let mut params = Self {
            dim,
            size,
            object_count,
            object_order,
            slice_count,
            echo_count: required_count(acqp, "ACQ_n_echo_images")?,
            phase_factor,
            rare_factor: optional_count(acqp, "ACQ_rare_factor")?.unwrap_or(1),
            repetition_count: required_count(acqp, "NR")?,
            spatial_phase_1: spatial_phase(acqp, "ACQ_spatial_size_1", "ACQ_spatial_phase_1")?,
            spatial_phase_2: spatial_phase(acqp, "ACQ_spatial_size_2", "ACQ_spatial_phase_2")?,
            block_format: acqp
                .find("GO_block_size")
                .and_then(|p| p.value(0))
                .is_some_and(|v| v.as_str() == "Standard_KBlock_Format"),
            data_format: DataFormat::from_parameter(acqp),
            endianness: Endianness::from_parameter(acqp),
            channel_count: 1,
            ..Default::default()
        };

        match protocol {
            Some(method) => params.extract_protocol(method)?,
            None => {
                debug!("No protocol document, deriving encode order from spatial phase");
                let ny = params.size.get(1).copied().unwrap_or(0);
                params.ky_order = EncodingOrder::from_phase_table(&params.spatial_phase_1, ny);
                params.kz_order = EncodingOrder::from_phase_table(&params.spatial_phase_2, ny);
            }
        }
        params.profile_data_length()?;
        Ok(params)
    }

    fn extract_protocol(&mut self, method: &ParameterFile) -> Result<(), RawDataError> {
        if let Some(receivers) = optional_count(method, "PVM_EncAvailReceivers")? {
            self.channel_count = receivers.max(1);
        }
        if let Some(p) = method.find("PVM_Matrix") {
            self.matrix = Some(exact_values(p, self.dim, |v| v.as_int())?);
        }
        if let Some(p) = method.find("PVM_AntiAlias") {
            self.anti_alias = Some(exact_values(p, self.dim, |v| v.as_float())?);
        }
        self.ky_order = step_table(method, "PVM_EncSteps1")?;
        self.kz_order = step_table(method, "PVM_EncSteps2")?;
        Ok(())
    }

    /// Number of kz iterations
    pub fn kz_steps(&self) -> usize {
        if self.dim <= 2 {
            1
        } else {
            self.size.get(2).copied().unwrap_or(0)
        }
    }

    /// Number of ky block iterations
    pub fn ky_blocks(&self) -> usize {
        if self.dim <= 1 {
            1
        } else {
            self.size.get(1).copied().unwrap_or(0) / self.phase_factor.max(1)
        }
    }

    /// Total number of records the loop structure produces
    pub fn profile_count(&self) -> Option<usize> {
        [
            self.repetition_count,
            self.kz_steps(),
            self.ky_blocks(),
            self.slice_count,
            self.phase_factor,
            self.echo_count,
        ]
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    /// Encoded bytes of one record before padding
    pub fn raw_profile_length(&self) -> Result<usize, RawDataError> {
        let readout = self.size.first().copied().unwrap_or(0);
        raw_record_length(self.data_format, readout, self.channel_count)
    }

    /// Byte stride between consecutive records
    pub fn profile_data_length(&self) -> Result<usize, RawDataError> {
        let readout = self.size.first().copied().unwrap_or(0);
        record_stride(
            self.data_format,
            readout,
            self.channel_count,
            self.block_format,
        )
    }
}

/// Builds the acquisition-ordered record list of a dataset
#[derive(Debug, Clone, Default)]
pub struct ProfileListGenerator {
    parameters: AcquisitionParameters,
}

impl ProfileListGenerator {
    /// Create a generator with no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from already extracted parameters
    pub fn from_parameters(parameters: AcquisitionParameters) -> Self {
        Self { parameters }
    }

    /// Extract parameters from the documents and generate the record list
    pub fn generate(
        &mut self,
        acqp: &ParameterFile,
        protocol: Option<&ParameterFile>,
    ) -> Result<ProfileList, RawDataError> {
        self.parameters = AcquisitionParameters::extract(acqp, protocol)?;
        debug!("Acquisition parameters:\n{}", self);
        self.build()
    }

    fn check_table(name: &str, order: &EncodingOrder, needed: usize) -> Result<(), RawDataError> {
        if !order.is_empty() && order.steps.len() < needed {
            return Err(RawDataError::DimensionMismatch {
                parameter: name.to_string(),
                expected: needed,
                actual: order.steps.len(),
            });
        }
        Ok(())
    }

    /// Run the acquisition loops over the current parameters
    pub fn build(&self) -> Result<ProfileList, RawDataError> {
        let p = &self.parameters;
        let kz_steps = p.kz_steps();
        let ky_blocks = p.ky_blocks();
        let ky_lines = ky_blocks.checked_mul(p.phase_factor).unwrap_or(usize::MAX);
        Self::check_table("ky encode order", &p.ky_order, ky_lines)?;
        Self::check_table("kz encode order", &p.kz_order, kz_steps)?;
        let slices = p.object_order.get(..p.slice_count).ok_or_else(|| {
            RawDataError::DimensionMismatch {
                parameter: "ACQ_obj_order".to_string(),
                expected: p.slice_count,
                actual: p.object_order.len(),
            }
        })?;

        let count = p
            .profile_count()
            .ok_or(RawDataError::AllocationFailure {
                requested: usize::MAX,
            })?;
        let stride = p.profile_data_length()? as u64;
        // The last record ends at stride * count, so the running offset stays in range
        stride
            .checked_mul(count as u64)
            .ok_or_else(|| RawDataError::InvalidParameter {
                name: "ACQ_size".to_string(),
                reason: format!("{} records of {} bytes overflow the file offset", count, stride),
            })?;
        let mut profiles = Vec::new();
        profiles
            .try_reserve_exact(count)
            .map_err(|_| RawDataError::AllocationFailure { requested: count })?;
        let profile_length = p.size.first().copied().unwrap_or(0) / 2;
        let mut position = 0u64;

        for repetition in 0..p.repetition_count {
            for kz in 0..kz_steps {
                for block in 0..ky_blocks {
                    for &object in slices {
                        for phase in 0..p.phase_factor {
                            for echo in 0..p.echo_count {
                                let mut profile = RawProfile::with_layout(
                                    profile_length,
                                    p.channel_count,
                                    p.data_format,
                                );
                                profile.object_no = object;
                                profile.slice_no = object;
                                profile.echo_no = echo;
                                profile.repetition_no = repetition;
                                profile.file_position = position;
                                profile.endianness = p.endianness;
                                let line = block * p.phase_factor + phase;
                                if let Some(&ky) = p.ky_order.steps.get(line) {
                                    profile.encode_step_1 = ky;
                                }
                                if let Some(&kz) = p.kz_order.steps.get(kz) {
                                    profile.encode_step_2 = kz;
                                }
                                profiles.push(profile);
                                position += stride;
                            }
                        }
                    }
                }
            }
        }

        debug!(
            "Generated {} profiles with a stride of {} bytes",
            profiles.len(),
            stride
        );
        Ok(profiles.into_iter().collect())
    }

    /// Extracted parameters
    pub fn parameters(&self) -> &AcquisitionParameters {
        &self.parameters
    }

    /// Receive channels per record
    pub fn channel_count(&self) -> usize {
        self.parameters.channel_count
    }

    /// `ACQ_dim`
    pub fn dimension_count(&self) -> usize {
        self.parameters.dim
    }

    /// Reconstructed matrix size along dimension `d`, 0 outside the acquisition.
    ///
    /// Uses `PVM_Matrix × PVM_AntiAlias` when the protocol supplied both;
    /// otherwise the acquired size, with the readout counted in complex samples.
    pub fn dimension_size(&self, d: usize) -> usize {
        let p = &self.parameters;
        if d >= p.dim {
            return 0;
        }
        let matrix = p.matrix.as_ref().and_then(|m| m.get(d));
        let anti_alias = p.anti_alias.as_ref().and_then(|a| a.get(d));
        if let (Some(&matrix), Some(&anti_alias)) = (matrix, anti_alias) {
            return (matrix as f64 * anti_alias).max(0.0) as usize;
        }
        let size = p.size.get(d).copied().unwrap_or(0);
        if d == 0 {
            size / 2
        } else {
            size
        }
    }

    /// `NI`
    pub fn object_count(&self) -> usize {
        self.parameters.object_count
    }

    /// `NSLICES`
    pub fn slice_count(&self) -> usize {
        self.parameters.slice_count
    }

    /// `ACQ_n_echo_images`
    pub fn echo_count(&self) -> usize {
        self.parameters.echo_count
    }

    /// `NR`
    pub fn repetition_count(&self) -> usize {
        self.parameters.repetition_count
    }

    /// `ACQ_rare_factor`
    pub fn rare_factor(&self) -> usize {
        self.parameters.rare_factor
    }

    /// Smallest ky encode step
    pub fn encoding_step_1_min(&self) -> i32 {
        self.parameters.ky_order.min
    }

    /// Largest ky encode step
    pub fn encoding_step_1_max(&self) -> i32 {
        self.parameters.ky_order.max
    }

    /// Smallest kz encode step
    pub fn encoding_step_2_min(&self) -> i32 {
        self.parameters.kz_order.min
    }

    /// Largest kz encode step
    pub fn encoding_step_2_max(&self) -> i32 {
        self.parameters.kz_order.max
    }

    /// Byte stride between records
    pub fn profile_data_length(&self) -> Result<usize, RawDataError> {
        self.parameters.profile_data_length()
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, name: &str, items: &[T]) -> fmt::Result {
    write!(f, "{}[{}]:", name, items.len())?;
    for item in items {
        write!(f, " {}", item)?;
    }
    writeln!(f)
}

impl fmt::Display for ProfileListGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.parameters;
        writeln!(f, "ACQ_dim: {}", p.dim)?;
        write_list(f, "ACQ_size", &p.size)?;
        writeln!(f, "NI: {}", p.object_count)?;
        write_list(f, "ACQ_obj_order", &p.object_order)?;
        writeln!(f, "NSLICES: {}", p.slice_count)?;
        writeln!(f, "ACQ_n_echo_images: {}", p.echo_count)?;
        writeln!(f, "ACQ_phase_factor: {}", p.phase_factor)?;
        writeln!(f, "ACQ_rare_factor: {}", p.rare_factor)?;
        writeln!(f, "NR: {}", p.repetition_count)?;
        writeln!(f, "channels: {}", p.channel_count)?;
        write_list(f, "ACQ_spatial_phase_1", &p.spatial_phase_1)?;
        write_list(f, "ACQ_spatial_phase_2", &p.spatial_phase_2)?;
        write_list(f, "ky_profile_order", &p.ky_order.steps)?;
        write_list(f, "kz_profile_order", &p.kz_order.steps)?;
        writeln!(f, "ky range: {}..={}", p.ky_order.min, p.ky_order.max)?;
        writeln!(f, "kz range: {}..={}", p.kz_order.min, p.kz_order.max)?;
        writeln!(f, "data format: {}", p.data_format.label())?;
        write!(f, "block format: {}", p.block_format)
    }
}
