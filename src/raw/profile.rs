//! One k-space line and its binary codec.
//!
//! A record covers `profile_length` complex samples for each receive channel,
//! stored channel after channel as interleaved real/imaginary values:
//!
//! ```text
//! offset ─► [re im re im ... ]  channel 0, profile_length pairs
//!           [re im re im ... ]  channel 1
//!           ...
//!           (zero padding up to the record stride in block format)
//! ```

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use super::error::RawDataError;
use super::format::{DataFormat, Endianness};

/// Headroom factor applied to the reference maximum on integer writes
const SCALE_HEADROOM: f64 = 1.1;

/// One acquired k-space line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawProfile {
    /// Complex samples per channel
    pub profile_length: usize,
    /// Receive channels stored in the record
    pub channel_count: usize,
    /// Phase encode step along the first direction (ky)
    pub encode_step_1: i32,
    /// Phase encode step along the second direction (kz)
    pub encode_step_2: i32,
    /// Receive channel, for records holding a single channel
    pub channel_no: usize,
    /// Object index in the scan order table
    pub object_no: usize,
    /// Slice index
    pub slice_no: usize,
    /// Echo index
    pub echo_no: usize,
    /// Repetition index
    pub repetition_no: usize,
    /// Absolute byte offset of the record in the raw data file
    pub file_position: u64,
    /// On-disk sample encoding
    pub data_format: DataFormat,
    /// On-disk byte order
    pub endianness: Endianness,
    data: Option<Vec<f32>>,
}

pub(crate) fn allocate_samples(count: usize) -> Result<Vec<f32>, RawDataError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(count)
        .map_err(|_| RawDataError::AllocationFailure { requested: count })?;
    buffer.resize(count, 0.0);
    Ok(buffer)
}

fn allocate_bytes(count: usize) -> Result<Vec<u8>, RawDataError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(count)
        .map_err(|_| RawDataError::AllocationFailure { requested: count })?;
    Ok(buffer)
}

fn seek_to<S: Seek>(stream: &mut S, position: u64) -> Result<(), RawDataError> {
    if stream.stream_position()? != position {
        stream.seek(SeekFrom::Start(position))?;
    }
    Ok(())
}

/// Read until `buf` is full or the stream ends; returns the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, RawDataError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn write_full<W: Write>(writer: &mut W, buf: &[u8]) -> Result<(), RawDataError> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                return Err(RawDataError::ShortWrite {
                    expected: buf.len(),
                    actual: written,
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn decode<B: ByteOrder>(format: DataFormat, bytes: &[u8], out: &mut [f32]) {
    let width = format.element_size();
    let samples = bytes.chunks_exact(width).zip(out.iter_mut());
    match format {
        DataFormat::Int16 => samples.for_each(|(b, s)| *s = f32::from(B::read_i16(b))),
        DataFormat::Int32 => samples.for_each(|(b, s)| *s = B::read_i32(b) as f32),
        DataFormat::Float32 => samples.for_each(|(b, s)| *s = B::read_f32(b)),
        DataFormat::None => {}
    }
}

fn encode<B: ByteOrder>(
    format: DataFormat,
    samples: &[f32],
    reference_max: f32,
    out: &mut Vec<u8>,
) -> std::io::Result<()> {
    let scale = |type_max: f64| {
        if reference_max != 0.0 {
            type_max / (f64::from(reference_max) * SCALE_HEADROOM)
        } else {
            0.0
        }
    };
    match format {
        DataFormat::Int16 => {
            let scale = scale(f64::from(i16::MAX));
            for &s in samples {
                out.write_i16::<B>((scale * f64::from(s)).round() as i16)?;
            }
        }
        DataFormat::Int32 => {
            let scale = scale(f64::from(i32::MAX));
            for &s in samples {
                out.write_i32::<B>((scale * f64::from(s)).round() as i32)?;
            }
        }
        DataFormat::Float32 => {
            for &s in samples {
                out.write_f32::<B>(s)?;
            }
        }
        DataFormat::None => {}
    }
    Ok(())
}

impl RawProfile {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with the given shape and encoding
    pub fn with_layout(profile_length: usize, channel_count: usize, data_format: DataFormat) -> Self {
        Self {
            profile_length,
            channel_count,
            data_format,
            ..Self::default()
        }
    }

    /// Number of `f32` values (real and imaginary parts) in the record
    pub fn value_count(&self) -> Result<usize, RawDataError> {
        self.profile_length
            .checked_mul(2)
            .and_then(|n| n.checked_mul(self.channel_count.max(1)))
            .ok_or(RawDataError::AllocationFailure {
                requested: usize::MAX,
            })
    }

    /// Encoded size of the record's samples in bytes, without padding
    pub fn byte_length(&self) -> Result<usize, RawDataError> {
        self.value_count()?
            .checked_mul(self.data_format.element_size())
            .ok_or(RawDataError::AllocationFailure {
                requested: usize::MAX,
            })
    }

    /// Decode the record's samples from `reader`.
    ///
    /// Records without a format are skipped. The stream is repositioned only
    /// when it is not already at the record offset, so sequential reads never
    /// seek. On a short read the complete samples that arrived are kept and
    /// the rest of the buffer is zero.
    pub fn read<R: Read + Seek>(&mut self, reader: &mut R) -> Result<(), RawDataError> {
        if self.data_format == DataFormat::None {
            return Ok(());
        }
        self.data = None;
        let mut samples = allocate_samples(self.value_count()?)?;
        let expected = self.byte_length()?;
        let mut bytes = allocate_bytes(expected)?;
        bytes.resize(expected, 0);

        seek_to(reader, self.file_position)?;
        let actual = read_full(reader, &mut bytes)?;
        let complete = &bytes[..actual - actual % self.data_format.element_size()];
        match self.endianness {
            Endianness::Little => decode::<LittleEndian>(self.data_format, complete, &mut samples),
            Endianness::Big => decode::<BigEndian>(self.data_format, complete, &mut samples),
        }
        self.data = Some(samples);

        if actual < expected {
            return Err(RawDataError::ShortRead { expected, actual });
        }
        Ok(())
    }

    /// Encode the record's samples to `writer`.
    ///
    /// Integer formats are scaled so that `reference_max` maps to 1/1.1 of
    /// the type maximum; a zero reference writes zeros. Floats are written
    /// unchanged.
    pub fn write<W: Write + Seek>(
        &self,
        writer: &mut W,
        reference_max: f32,
    ) -> Result<(), RawDataError> {
        if self.data_format == DataFormat::None {
            return Err(RawDataError::NoFormat);
        }
        let samples = self.data.as_deref().ok_or(RawDataError::NoData)?;

        let mut bytes = allocate_bytes(self.byte_length()?)?;
        match self.endianness {
            Endianness::Little => {
                encode::<LittleEndian>(self.data_format, samples, reference_max, &mut bytes)?
            }
            Endianness::Big => {
                encode::<BigEndian>(self.data_format, samples, reference_max, &mut bytes)?
            }
        }

        seek_to(writer, self.file_position)?;
        write_full(writer, &bytes)
    }

    /// Whether samples have been loaded
    pub fn has_samples(&self) -> bool {
        self.data.is_some()
    }

    /// Interleaved real/imaginary samples, if loaded
    pub fn samples(&self) -> Option<&[f32]> {
        self.data.as_deref()
    }

    /// Replace the record's samples with a copy of `samples`
    pub fn set_samples(&mut self, samples: &[f32]) -> Result<(), RawDataError> {
        let expected = self.value_count()?;
        if samples.len() != expected {
            return Err(RawDataError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        let mut buffer = allocate_samples(expected)?;
        buffer.copy_from_slice(samples);
        self.data = Some(buffer);
        Ok(())
    }

    /// Drop the sample buffer
    pub fn clear_samples(&mut self) {
        self.data = None;
    }

    /// Samples as `(re, im)` pairs, channel-major
    pub fn complex_samples(&self) -> Option<impl Iterator<Item = (f32, f32)> + '_> {
        self.data
            .as_deref()
            .map(|d| d.chunks_exact(2).map(|c| (c[0], c[1])))
    }

    /// Largest sample magnitude in the record, 0 when nothing is loaded
    pub fn max_data_value(&self) -> f32 {
        self.data
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .fold(0.0f32, |max, s| max.max(s.abs()))
    }
}
