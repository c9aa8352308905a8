//! # ParaVision Parameter Files
//!
//! Parser, document model and serializer for the JCAMP-DX dialect ParaVision
//! writes to `acqp`, `method`, `subject` and `visu_pars`.
//!
//! ## Document Structure
//!
//! ```text
//! ParameterFile
//! └── Parameter* (declaration order)
//!     ├── name, kind (plain / info / visualization)
//!     ├── dimensions (0..n sizes)
//!     └── ValueSlot[capacity]
//!         └── Value chain (one value, or a parenthesised group)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bruker2mrd::parameters::ParameterFile;
//!
//! let doc = ParameterFile::parse("##$ACQ_size=( 2 )\n256 128\n##$NI=3\n")?;
//! let size = doc.find("ACQ_size").unwrap();
//! assert_eq!(size.value(1).unwrap().as_int(), 128);
//! assert_eq!(doc.to_string(), "##$ACQ_size=( 2 )\n256 128\n##$NI=3\n");
//! # Ok::<(), bruker2mrd::parameters::ParameterError>(())
//! ```

mod document;
mod error;
mod lexer;
mod parameter;
mod parser;
mod serializer;
mod value;


pub use document::ParameterFile;
pub use error::ParameterError;
pub use lexer::{Lexer, Token};
pub use parameter::{value_capacity, Parameter, ParameterKind};
pub use parser::ParameterParser;
pub use serializer::{wrap_words, MAX_LINE_LENGTH};
pub use value::{Value, ValueSlot};
