use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::acquisition::{Acquisition, EncodingSummary};
use super::error::DatasetError;

/// Destination of a conversion: a header, then acquisitions in order
pub trait AcquisitionSink {
    /// Write the encoded-space description; called once before any acquisition
    fn write_header(&mut self, summary: &EncodingSummary) -> Result<(), DatasetError>;

    /// Append one acquisition
    fn append(&mut self, acquisition: &Acquisition) -> Result<(), DatasetError>;

    /// Flush and close the destination
    fn finish(&mut self) -> Result<(), DatasetError> {
        Ok(())
    }
}

/// Writes the header and every acquisition as one JSON document per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) a JSON lines file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of acquisitions appended so far
    pub fn acquisitions_written(&self) -> usize {
        self.written
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: serde::Serialize>(&mut self, value: &T) -> Result<(), DatasetError> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> AcquisitionSink for JsonLinesSink<W> {
    fn write_header(&mut self, summary: &EncodingSummary) -> Result<(), DatasetError> {
        self.write_line(summary)
    }

    fn append(&mut self, acquisition: &Acquisition) -> Result<(), DatasetError> {
        self.write_line(acquisition)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DatasetError> {
        self.writer.flush()?;
        Ok(())
    }
}
