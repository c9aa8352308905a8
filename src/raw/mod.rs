//! # Raw Data Profiles
//!
//! Record model, binary codec and acquisition-order generation for the
//! ParaVision `fid`/`rawdata.job0` file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use bruker2mrd::parameters::ParameterFile;
//! use bruker2mrd::raw::ProfileListGenerator;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let acqp = ParameterFile::open("scan/acqp")?;
//! let method = ParameterFile::open("scan/method")?;
//! let mut generator = ProfileListGenerator::new();
//! let mut profiles = generator.generate(&acqp, Some(&method))?;
//!
//! let mut fid = BufReader::new(File::open("scan/fid")?);
//! for profile in profiles.iter_mut() {
//!     profile.read(&mut fid)?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod format;
mod generator;
mod kspace;
mod list;
mod profile;

#[cfg(test)]
mod tests;

pub use error::RawDataError;
pub use format::{DataFormat, Endianness};
pub use generator::{
    padded_profile_length, raw_record_length, record_stride, AcquisitionParameters, EncodingOrder,
    ProfileListGenerator, BLOCK_SIZE,
};
pub use kspace::KSpaceArray;
pub use list::ProfileList;
pub use profile::RawProfile;
