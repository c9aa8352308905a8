//! Token-driven construction of a [`ParameterFile`].
//!
//! The grammar is strictly forward: a declaration token opens a new parameter,
//! which then receives every name, dimension and value token until the next
//! declaration.

use log::debug;

use super::document::ParameterFile;
use super::error::ParameterError;
use super::lexer::{Lexer, Token};
use super::parameter::{Parameter, ParameterKind};
use super::value::Value;

/// Parser state: the document built so far and the open parameter
#[derive(Debug, Default)]
pub struct ParameterParser {
    document: ParameterFile,
    /// Position of the parameter receiving tokens
    current: Option<usize>,
}

impl ParameterParser {
    /// Create a parser with an empty document
    pub fn new() -> Self {
        Self::default()
    }

    fn current_mut(&mut self, token: &Token) -> Result<&mut Parameter, ParameterError> {
        self.current
            .and_then(|index| self.document.get_mut(index))
            .ok_or_else(|| ParameterError::OrphanToken {
                token: token.to_string(),
            })
    }

    fn open(&mut self, kind: ParameterKind) {
        self.document.push(Parameter::new(kind));
        self.current = Some(self.document.len() - 1);
    }

    /// Apply one token to the document
    pub fn feed(&mut self, token: Token) -> Result<(), ParameterError> {
        match token {
            Token::ParameterStart => self.open(ParameterKind::Plain),
            Token::VisualizationStart => self.open(ParameterKind::Visualization),
            Token::InfoStart => self.open(ParameterKind::Info),
            Token::Name(ref name) => {
                let name = name.clone();
                self.current_mut(&token)?.set_name(name);
            }
            Token::DimensionSize(size) => self.current_mut(&token)?.append_dimension(size),
            Token::StringValue(ref s) => {
                let value = Value::String(s.clone());
                self.current_mut(&token)?.new_value(value)?;
            }
            Token::LabelValue(ref s) => {
                let value = Value::Label(s.clone());
                self.current_mut(&token)?.new_value(value)?;
            }
            Token::FloatValue(ref s) => {
                let value = Value::Float(s.clone());
                self.current_mut(&token)?.new_value(value)?;
            }
            Token::IntegerValue(ref s) => {
                let value = Value::Integer(s.clone());
                self.current_mut(&token)?.new_value(value)?;
            }
            Token::MultiValueStart => self.current_mut(&token)?.set_multi_value_mode(true)?,
            Token::MultiValueEnd => self.current_mut(&token)?.set_multi_value_mode(false)?,
        }
        Ok(())
    }

    /// Consume the parser and return the finished document
    pub fn finish(self) -> ParameterFile {
        debug!("Parsed {} parameter entries", self.document.len());
        self.document
    }

    /// Parse a complete token stream
    pub fn parse_tokens<I>(tokens: I) -> Result<ParameterFile, ParameterError>
    where
        I: IntoIterator<Item = Result<Token, ParameterError>>,
    {
        let mut parser = Self::new();
        for token in tokens {
            parser.feed(token?)?;
        }
        Ok(parser.finish())
    }

    /// Tokenize and parse parameter file text
    pub fn parse_str(text: &str) -> Result<ParameterFile, ParameterError> {
        Self::parse_tokens(Lexer::new(text))
    }
}
