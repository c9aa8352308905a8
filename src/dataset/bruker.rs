use std::path::{Path, PathBuf};

use log::{debug, info};

use super::error::DatasetError;
use crate::parameters::ParameterFile;
use crate::raw::{ProfileList, ProfileListGenerator};

/// File names inside a scan directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    /// Acquisition parameters
    pub acqp: String,
    /// Protocol parameters
    pub method: String,
    /// Raw sample data
    pub fid: String,
    /// Subject parameters, looked up in the study directory above the scan
    pub subject: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            acqp: "acqp".to_string(),
            method: "method".to_string(),
            fid: "fid".to_string(),
            subject: "subject".to_string(),
        }
    }
}

/// One ParaVision scan directory
///
/// ```text
/// study/
/// ├── subject          (optional)
/// └── 5/               <- scan directory
///     ├── acqp
///     ├── method       (optional)
///     └── fid
/// ```
#[derive(Debug, Clone)]
pub struct BrukerDataset {
    root: PathBuf,
    acqp: ParameterFile,
    method: Option<ParameterFile>,
    subject: Option<ParameterFile>,
    fid_path: PathBuf,
}

fn open_optional(path: &Path) -> Result<Option<ParameterFile>, DatasetError> {
    if path.is_file() {
        Ok(Some(ParameterFile::open(path)?))
    } else {
        debug!("No parameter file at {}", path.display());
        Ok(None)
    }
}

impl BrukerDataset {
    /// Open a scan directory with the standard file names
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, DatasetError> {
        Self::open_with_layout(root, &DatasetLayout::default())
    }

    /// Open a scan directory with custom file names
    pub fn open_with_layout<P: AsRef<Path>>(
        root: P,
        layout: &DatasetLayout,
    ) -> Result<Self, DatasetError> {
        let root = root.as_ref().to_path_buf();

        let acqp_path = root.join(&layout.acqp);
        if !acqp_path.is_file() {
            return Err(DatasetError::MissingFile(acqp_path));
        }
        let fid_path = root.join(&layout.fid);
        if !fid_path.is_file() {
            return Err(DatasetError::MissingFile(fid_path));
        }

        let acqp = ParameterFile::open(&acqp_path)?;
        let method = open_optional(&root.join(&layout.method))?;
        let subject = match root.parent() {
            Some(study) => open_optional(&study.join(&layout.subject))?,
            None => None,
        };

        info!(
            "Opened dataset {} ({} acqp parameters, method {})",
            root.display(),
            acqp.len(),
            if method.is_some() { "present" } else { "absent" }
        );

        Ok(Self {
            root,
            acqp,
            method,
            subject,
            fid_path,
        })
    }

    /// Scan directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Acquisition parameters
    pub fn acqp(&self) -> &ParameterFile {
        &self.acqp
    }

    /// Protocol parameters, if the scan has a method file
    pub fn method(&self) -> Option<&ParameterFile> {
        self.method.as_ref()
    }

    /// Subject parameters, if the study has a subject file
    pub fn subject(&self) -> Option<&ParameterFile> {
        self.subject.as_ref()
    }

    /// Path of the raw data file
    pub fn fid_path(&self) -> &Path {
        &self.fid_path
    }

    /// Generate the record list.
    ///
    /// With `use_method` unset, or without a method file, encode order is
    /// derived from the spatial phase tables in `acqp`.
    pub fn profiles(
        &self,
        use_method: bool,
    ) -> Result<(ProfileListGenerator, ProfileList), DatasetError> {
        let protocol = if use_method { self.method() } else { None };
        let mut generator = ProfileListGenerator::new();
        let profiles = generator.generate(&self.acqp, protocol)?;
        Ok((generator, profiles))
    }
}
