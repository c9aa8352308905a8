//! # Dataset Conversion
//!
//! Opens a ParaVision scan directory, generates its records and streams the
//! decoded k-space lines to a container writer.
//!
//! ## Output Boundary
//!
//! A conversion hands an [`AcquisitionSink`] one [`EncodingSummary`] followed
//! by one [`Acquisition`] per record, in acquisition order. [`JsonLinesSink`]
//! writes them as JSON lines:
//!
//! ```text
//! {"matrix_size":[128,128,1],"receiver_channels":1,...}     <- header
//! {"scan_counter":0,"flags":4161,"idx":{...},"data":[...]}  <- acquisition 0
//! {"scan_counter":1,...}
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bruker2mrd::dataset::{BrukerDataset, DatasetConverter, JsonLinesSink};
//!
//! let dataset = BrukerDataset::open("study/5")?;
//! let mut sink = JsonLinesSink::create("scan5.jsonl")?;
//! let stats = DatasetConverter::new().convert(&dataset, &mut sink)?;
//! println!("{}", stats);
//! # Ok::<(), bruker2mrd::dataset::DatasetError>(())
//! ```

mod acquisition;
mod bruker;
mod converter;
mod error;
mod sink;


pub use acquisition::{
    Acquisition, AcquisitionFlags, EncodingCounters, EncodingLimit, EncodingSummary, SubjectInfo,
};
pub use bruker::{BrukerDataset, DatasetLayout};
pub use converter::{
    requantize, ConversionConfig, ConversionStats, DatasetConverter, RequantizeStats,
};
pub use error::DatasetError;
pub use sink::{AcquisitionSink, JsonLinesSink};
