use log::warn;

use crate::parameters::ParameterFile;

/// On-disk sample encoding of a raw data file (`GO_raw_data_format`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Unknown or undeclared; records are skipped by the codec
    #[default]
    None,
    /// `GO_16BIT_SGN_INT`
    Int16,
    /// `GO_32BIT_SGN_INT`
    Int32,
    /// `GO_32BIT_FLOAT`
    Float32,
}

impl DataFormat {
    /// Map a vendor enumerator to a format
    pub fn from_label(label: &str) -> Self {
        match label {
            "GO_16BIT_SGN_INT" => DataFormat::Int16,
            "GO_32BIT_SGN_INT" => DataFormat::Int32,
            "GO_32BIT_FLOAT" => DataFormat::Float32,
            _ => DataFormat::None,
        }
    }

    /// Vendor enumerator for this format
    pub fn label(&self) -> &'static str {
        match self {
            DataFormat::None => "GO_FORMAT_NONE",
            DataFormat::Int16 => "GO_16BIT_SGN_INT",
            DataFormat::Int32 => "GO_32BIT_SGN_INT",
            DataFormat::Float32 => "GO_32BIT_FLOAT",
        }
    }

    /// Read `GO_raw_data_format` from an acquisition document
    pub fn from_parameter(acqp: &ParameterFile) -> Self {
        let Some(value) = acqp.find("GO_raw_data_format").and_then(|p| p.value(0)) else {
            return DataFormat::None;
        };
        let format = Self::from_label(value.as_str());
        if format == DataFormat::None {
            warn!("Unsupported raw data format '{}'", value.as_str());
        }
        format
    }

    /// Bytes per stored value; undeclared formats count as 16-bit
    pub fn element_size(&self) -> usize {
        match self {
            DataFormat::Int32 | DataFormat::Float32 => 4,
            DataFormat::Int16 | DataFormat::None => 2,
        }
    }
}

/// Byte order of the raw data file (`BYTORDA`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// `little`
    #[default]
    Little,
    /// `big`
    Big,
}

impl Endianness {
    /// Read `BYTORDA` from an acquisition document, defaulting to little endian
    pub fn from_parameter(acqp: &ParameterFile) -> Self {
        match acqp.find("BYTORDA").and_then(|p| p.value(0)).map(|v| v.as_str()) {
            Some("big") => Endianness::Big,
            Some("little") | None => Endianness::Little,
            Some(other) => {
                warn!("Unknown byte order '{}', assuming little endian", other);
                Endianness::Little
            }
        }
    }
}
