/// Errors produced by the raw-data codec and the profile list generator
#[derive(Debug, thiserror::Error)]
pub enum RawDataError {
    /// I/O error on the raw data stream
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The record has no sample encoding, so it cannot be written
    #[error("Record has no sample format")]
    NoFormat,

    /// The record holds no samples to write
    #[error("Record has no sample data")]
    NoData,

    /// Fewer bytes than a full record were available
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes in one record
        expected: usize,
        /// Bytes actually transferred
        actual: usize,
    },

    /// The stream accepted fewer bytes than a full record
    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite {
        /// Bytes in one record
        expected: usize,
        /// Bytes actually transferred
        actual: usize,
    },

    /// A sample buffer could not be allocated
    #[error("Unable to allocate a buffer of {requested} samples")]
    AllocationFailure {
        /// Number of elements requested
        requested: usize,
    },

    /// A vector parameter disagrees with the count it is paired with
    #[error("Parameter '{parameter}' has {actual} value(s), expected {expected}")]
    DimensionMismatch {
        /// Offending parameter
        parameter: String,
        /// Length implied by the paired scalar
        expected: usize,
        /// Length found
        actual: usize,
    },

    /// A parameter the generator cannot work without is absent
    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    /// A parameter is present but its value is unusable
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Offending parameter
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Replacement samples do not fill the record exactly
    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch {
        /// Values in one record
        expected: usize,
        /// Values supplied
        actual: usize,
    },

    /// The record's indices fall outside a k-space array
    #[error("Index {index} outside k-space axis {axis} of size {size}")]
    KSpaceBounds {
        /// Axis of the k-space array
        axis: usize,
        /// Offending index, relative to the axis origin
        index: i64,
        /// Axis length
        size: usize,
    },
}
