/// Errors that can occur while tokenizing, parsing or editing a parameter file
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    /// I/O error reading or writing a parameter file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A name, dimension or value token arrived before any declaration
    #[error("{token} token received with no open parameter")]
    OrphanToken {
        /// Description of the offending token
        token: String,
    },

    /// More values were supplied than the declared dimensions allow
    #[error("Parameter '{parameter}' holds at most {capacity} value(s)")]
    CapacityExceeded {
        /// Name of the parameter receiving the value
        parameter: String,
        /// Number of value slots allocated for the parameter
        capacity: usize,
    },

    /// Malformed input that the tokenizer could not classify
    #[error("Syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based source line
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A parameter with this name already exists in the document
    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    /// Position outside the parameter sequence
    #[error("Index {index} out of range for document with {len} parameter(s)")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of parameters in the document
        len: usize,
    },
}
