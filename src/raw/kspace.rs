use super::error::RawDataError;
use super::profile::{allocate_samples, RawProfile};

/// Dense complex k-space array with axes `[kx, ky, kz, object, repetition]`.
///
/// Samples are interleaved real/imaginary `f32` values with `kx` varying
/// fastest. The `kx` axis covers one whole record, every channel included.
#[derive(Debug, Clone, PartialEq)]
pub struct KSpaceArray {
    dims: [usize; 5],
    data: Vec<f32>,
}

impl KSpaceArray {
    /// Zero-filled array of the given size
    pub fn zeros(dims: [usize; 5]) -> Result<Self, RawDataError> {
        let count = Self::value_count(dims)?;
        Ok(Self {
            dims,
            data: allocate_samples(count)?,
        })
    }

    /// Wrap existing interleaved samples
    pub fn from_vec(dims: [usize; 5], data: Vec<f32>) -> Result<Self, RawDataError> {
        let expected = Self::value_count(dims)?;
        if data.len() != expected {
            return Err(RawDataError::SampleCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    fn value_count(dims: [usize; 5]) -> Result<usize, RawDataError> {
        dims.iter()
            .try_fold(2usize, |acc, &d| acc.checked_mul(d))
            .ok_or(RawDataError::AllocationFailure {
                requested: usize::MAX,
            })
    }

    /// Axis sizes
    pub fn dims(&self) -> [usize; 5] {
        self.dims
    }

    /// Interleaved samples
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable interleaved samples
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Range of `data` holding the line addressed by `profile`.
    ///
    /// Encode steps are shifted by `ky_min`/`kz_min`; when absent the axis is
    /// assumed centred, i.e. the minimum is `-(size / 2)`.
    pub fn line_range(
        &self,
        profile: &RawProfile,
        ky_min: Option<i32>,
        kz_min: Option<i32>,
    ) -> Result<std::ops::Range<usize>, RawDataError> {
        let [nx, ny, nz, nobj, nrep] = self.dims;
        let line = profile.value_count()? / 2;
        if nx != line {
            return Err(RawDataError::SampleCountMismatch {
                expected: line,
                actual: nx,
            });
        }

        let ky_min = ky_min.map_or(-((ny / 2) as i64), i64::from);
        let kz_min = kz_min.map_or(-((nz / 2) as i64), i64::from);
        let ky = checked_axis(1, i64::from(profile.encode_step_1) - ky_min, ny)?;
        let kz = checked_axis(2, i64::from(profile.encode_step_2) - kz_min, nz)?;
        let object = checked_axis(3, profile.object_no as i64, nobj)?;
        let repetition = checked_axis(4, profile.repetition_no as i64, nrep)?;

        let index = (((repetition * nobj + object) * nz + kz) * ny + ky) * nx;
        Ok(2 * index..2 * (index + nx))
    }
}

fn checked_axis(axis: usize, index: i64, size: usize) -> Result<usize, RawDataError> {
    match usize::try_from(index) {
        Ok(i) if i < size => Ok(i),
        _ => Err(RawDataError::KSpaceBounds { axis, index, size }),
    }
}

impl RawProfile {
    /// Copy this record's line out of a k-space array
    pub fn load_from_kspace(
        &mut self,
        kspace: &KSpaceArray,
        ky_min: Option<i32>,
        kz_min: Option<i32>,
    ) -> Result<(), RawDataError> {
        let range = kspace.line_range(self, ky_min, kz_min)?;
        self.set_samples(&kspace.data()[range])
    }
}
