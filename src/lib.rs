//! # bruker2mrd - ParaVision raw data to MRI raw-data containers
//!
//! `bruker2mrd` reads the text parameter files and binary `fid` sample file of a
//! Bruker ParaVision scan, reconstructs the order in which the scanner wrote its
//! k-space lines, and hands every line to a container writer as a self-describing
//! acquisition.
//!
//! ## Key Features
//!
//! - **Lossless parameter documents**: the JCAMP-style `acqp`/`method`/`subject`
//!   files parse into an ordered document that renders back to text with
//!   ParaVision's line-wrapping rules.
//!
//! - **Acquisition-order generation**: record offsets, slice, echo, repetition and
//!   phase-encode indices are derived from metadata alone, including the 1024-byte
//!   block padding of `Standard_KBlock_Format` data.
//!
//! - **Sample codec**: 16/32-bit integer and 32-bit float samples in either byte
//!   order, with amplitude-scaled integer writes that keep 10% headroom.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bruker2mrd::dataset::{BrukerDataset, DatasetConverter, JsonLinesSink};
//!
//! let dataset = BrukerDataset::open("study/5")?;
//! let mut sink = JsonLinesSink::create("scan5.jsonl")?;
//! let stats = DatasetConverter::new().convert(&dataset, &mut sink)?;
//! println!("Wrote {} acquisitions", stats.acquisitions_written);
//! # Ok::<(), bruker2mrd::dataset::DatasetError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`parameters`]: tokenizer, parser, document model and serializer for
//!   parameter files
//! - [`raw`]: profile records, the binary codec and the acquisition-order generator
//! - [`dataset`]: scan directories, conversion to acquisitions and re-encoding

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod dataset;
pub mod parameters;
pub mod raw;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::dataset::{
        requantize, Acquisition, AcquisitionFlags, AcquisitionSink, BrukerDataset,
        ConversionConfig, ConversionStats, DatasetConverter, DatasetError, EncodingSummary,
        JsonLinesSink,
    };
    pub use crate::parameters::{Parameter, ParameterError, ParameterFile, ParameterKind, Value};
    pub use crate::raw::{
        DataFormat, Endianness, ProfileList, ProfileListGenerator, RawDataError, RawProfile,
    };
}
