use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;

use super::error::ParameterError;
use super::parameter::Parameter;
use super::parser::ParameterParser;

/// An ordered parameter document (`acqp`, `method`, `subject`, ...)
///
/// Parameters keep declaration order. Neighbour lookup is by position, so
/// edits never leave dangling links behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterFile {
    parameters: Vec<Parameter>,
}

impl ParameterFile {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a parameter file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        // Vendor files are ASCII; anything else is carried through lossily
        let text = String::from_utf8_lossy(&bytes);
        let document = Self::parse(&text)?;
        debug!(
            "Loaded {} parameters from {}",
            document.len(),
            path.display()
        );
        Ok(document)
    }

    /// Parse parameter file text
    pub fn parse(text: &str) -> Result<Self, ParameterError> {
        ParameterParser::parse_str(text)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the document holds no parameters
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter at `index`
    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    /// Mutable parameter at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.parameters.get_mut(index)
    }

    /// First parameter of the document
    pub fn first(&self) -> Option<&Parameter> {
        self.parameters.first()
    }

    /// Parameter following `index`
    pub fn next(&self, index: usize) -> Option<&Parameter> {
        index.checked_add(1).and_then(|i| self.parameters.get(i))
    }

    /// Parameter preceding `index`
    pub fn previous(&self, index: usize) -> Option<&Parameter> {
        index.checked_sub(1).and_then(|i| self.parameters.get(i))
    }

    /// Iterate in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// First parameter named `name`
    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Position of the first parameter named `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name() == name)
    }

    /// Append a parameter at the end without checking its name.
    ///
    /// Used by the parser, which keeps the source document as written.
    pub(crate) fn push(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    fn check_insert(&self, index: usize, parameter: &Parameter) -> Result<(), ParameterError> {
        if index >= self.parameters.len() {
            return Err(ParameterError::IndexOutOfRange {
                index,
                len: self.parameters.len(),
            });
        }
        if !parameter.name().is_empty() && self.find(parameter.name()).is_some() {
            return Err(ParameterError::DuplicateParameter(
                parameter.name().to_string(),
            ));
        }
        Ok(())
    }

    /// Append a parameter; named parameters must be unique
    pub fn append(&mut self, parameter: Parameter) -> Result<(), ParameterError> {
        if !parameter.name().is_empty() && self.find(parameter.name()).is_some() {
            return Err(ParameterError::DuplicateParameter(
                parameter.name().to_string(),
            ));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    /// Insert `parameter` directly before position `index`
    pub fn insert_before(
        &mut self,
        index: usize,
        parameter: Parameter,
    ) -> Result<(), ParameterError> {
        self.check_insert(index, &parameter)?;
        self.parameters.insert(index, parameter);
        Ok(())
    }

    /// Insert `parameter` directly after position `index`
    pub fn insert_after(
        &mut self,
        index: usize,
        parameter: Parameter,
    ) -> Result<(), ParameterError> {
        self.check_insert(index, &parameter)?;
        self.parameters.insert(index + 1, parameter);
        Ok(())
    }

    /// Remove the parameter at `index`, joining its neighbours
    pub fn unlink(&mut self, index: usize) -> Result<Parameter, ParameterError> {
        if index >= self.parameters.len() {
            return Err(ParameterError::IndexOutOfRange {
                index,
                len: self.parameters.len(),
            });
        }
        Ok(self.parameters.remove(index))
    }

    /// Render the whole document in vendor text form
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ParameterError> {
        for parameter in &self.parameters {
            write!(writer, "{}", parameter)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ParameterFile {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}
