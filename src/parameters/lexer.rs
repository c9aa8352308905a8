//! Tokenizer for ParaVision JCAMP-DX parameter files.
//!
//! The lexer is line oriented. Entry markers are only recognised at the start
//! of a line; everything else is value text:
//!
//! ```text
//! ##TITLE=Parameter List           -> InfoStart, Label("TITLE=Parameter List")
//! $$ @vis= ACQ_size                -> VisualizationStart, Label("ACQ_size")
//! $$ /opt/PV6/data/acqp            -> (comment, skipped)
//! ##$ACQ_size=( 2 )                -> ParameterStart, Name("ACQ_size"), Dim(2)
//! 256 128                          -> Integer("256"), Integer("128")
//! ##$ACQ_jobs=( 1 )
//! (524288, 32, <job0>)             -> MultiStart, Integer, Integer, String("job0"), MultiEnd
//! ##$ACQ_phase=@3*(0.5)            -> Float("0.5") x3
//! ```

use std::collections::VecDeque;
use std::fmt;

use log::trace;

use super::error::ParameterError;

/// Lexical token consumed by the parameter parser
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `##$` declaration start
    ParameterStart,
    /// `$$ @vis=` declaration start
    VisualizationStart,
    /// `##` header line start
    InfoStart,
    /// Name of the parameter being declared
    Name(String),
    /// One declared dimension size
    DimensionSize(usize),
    /// `<...>` string, without brackets
    StringValue(String),
    /// Bare word
    LabelValue(String),
    /// Floating-point literal
    FloatValue(String),
    /// Integer literal
    IntegerValue(String),
    /// `(` opening a multi-value group
    MultiValueStart,
    /// `)` closing a multi-value group
    MultiValueEnd,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ParameterStart => f.write_str("parameter start"),
            Token::VisualizationStart => f.write_str("visualization start"),
            Token::InfoStart => f.write_str("info start"),
            Token::Name(n) => write!(f, "name '{}'", n),
            Token::DimensionSize(d) => write!(f, "dimension size {}", d),
            Token::StringValue(s) => write!(f, "string value <{}>", s),
            Token::LabelValue(s) => write!(f, "label value '{}'", s),
            Token::FloatValue(s) => write!(f, "float value {}", s),
            Token::IntegerValue(s) => write!(f, "integer value {}", s),
            Token::MultiValueStart => f.write_str("multi-value start"),
            Token::MultiValueEnd => f.write_str("multi-value end"),
        }
    }
}

/// Pull-based tokenizer over the text of a parameter file
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    at_line_start: bool,
    pending: VecDeque<Token>,
    /// Expansion of the current `@N*(v)` group, emitted lazily
    repeat: Option<(Token, usize)>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            at_line_start: true,
            pending: VecDeque::new(),
            repeat: None,
            failed: false,
        }
    }

    /// Current 1-based line number
    pub fn line(&self) -> usize {
        self.line
    }

    fn syntax_error(&self, message: impl Into<String>) -> ParameterError {
        ParameterError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Text up to (not including) the next line break
    fn line_remainder(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find('\n').unwrap_or(rest.len());
        rest[..end].trim_end_matches('\r')
    }

    fn skip_to_line_end(&mut self) {
        let rest = self.rest();
        self.pos += rest.find('\n').unwrap_or(rest.len());
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.text.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.at_line_start = true;
                }
                b' ' | b'\t' | b'\r' => {}
                _ => break,
            }
            self.pos += 1;
        }
    }

    fn lex_declaration(&mut self) -> Result<(), ParameterError> {
        self.pos += 3;
        let line = self.line_remainder();
        let eq = line
            .find('=')
            .ok_or_else(|| self.syntax_error("missing '=' after parameter name"))?;
        self.pending.push_back(Token::ParameterStart);
        self.pending
            .push_back(Token::Name(line[..eq].trim().to_string()));
        self.pos += eq + 1;

        let after = self.line_remainder();
        if let Some(dimensions) = parse_dimension_list(after) {
            self.pending
                .extend(dimensions.into_iter().map(Token::DimensionSize));
            self.skip_to_line_end();
        }
        Ok(())
    }

    fn lex_info(&mut self) {
        self.pos += 2;
        let text = self.line_remainder();
        self.pending.push_back(Token::InfoStart);
        self.pending.push_back(Token::LabelValue(text.to_string()));
        self.skip_to_line_end();
    }

    fn lex_dollar_line(&mut self) {
        let body = self.line_remainder()[2..].trim_start();
        if let Some(vis) = body.strip_prefix("@vis=") {
            self.pending.push_back(Token::VisualizationStart);
            self.pending
                .push_back(Token::LabelValue(vis.trim_start().to_string()));
        } else {
            trace!("Skipping comment on line {}: {}", self.line, body);
        }
        self.skip_to_line_end();
    }

    fn lex_string(&mut self) -> Result<Token, ParameterError> {
        let rest = &self.rest()[1..];
        let end = rest
            .find('>')
            .ok_or_else(|| self.syntax_error("unterminated string"))?;
        let raw = &rest[..end];
        self.line += raw.matches('\n').count();
        self.pos += end + 2;
        Ok(Token::StringValue(
            raw.chars().filter(|&c| c != '\n' && c != '\r').collect(),
        ))
    }

    /// `@N*(value)` run-length group
    fn lex_repeat(&mut self) -> Result<(), ParameterError> {
        let rest = &self.rest()[1..];
        let star = rest
            .find('*')
            .ok_or_else(|| self.syntax_error("expected '*' in repeat group"))?;
        let count: usize = rest[..star]
            .trim()
            .parse()
            .map_err(|_| self.syntax_error("invalid repeat count"))?;
        let group = rest[star + 1..].trim_start();
        if !group.starts_with('(') {
            return Err(self.syntax_error("expected '(' after repeat count"));
        }
        let close = group
            .find(')')
            .ok_or_else(|| self.syntax_error("unterminated repeat group"))?;
        let inner = group[1..close].trim();
        let token = match inner.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            Some(s) => Token::StringValue(s.to_string()),
            None => classify_word(inner),
        };
        let consumed = 1 + (rest.len() - group.len()) + close + 1;
        self.pos += consumed;
        self.repeat = Some((token, count));
        Ok(())
    }

    fn lex_word(&mut self) -> Token {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '<'))
            .unwrap_or(rest.len());
        let end = if end == 0 {
            rest.chars().next().map_or(1, char::len_utf8)
        } else {
            end
        };
        let word = &rest[..end];
        self.pos += end;
        classify_word(word)
    }

    fn advance(&mut self) -> Result<Option<Token>, ParameterError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            if let Some((token, remaining)) = self.repeat.as_mut() {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(Some(token.clone()));
                }
                self.repeat = None;
            }
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Ok(None);
            }

            if self.at_line_start {
                self.at_line_start = false;
                if rest.starts_with("##$") {
                    self.lex_declaration()?;
                    continue;
                }
                if rest.starts_with("##") {
                    self.lex_info();
                    continue;
                }
                if rest.starts_with("$$") {
                    self.lex_dollar_line();
                    continue;
                }
            }

            match rest.as_bytes()[0] {
                b'<' => return self.lex_string().map(Some),
                b'(' => {
                    self.pos += 1;
                    return Ok(Some(Token::MultiValueStart));
                }
                b')' => {
                    self.pos += 1;
                    return Ok(Some(Token::MultiValueEnd));
                }
                b',' => self.pos += 1,
                b'@' => self.lex_repeat()?,
                _ => return Ok(Some(self.lex_word())),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParameterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.advance() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// `( d0, d1, ... )` dimension list, if `text` is exactly one
fn parse_dimension_list(text: &str) -> Option<Vec<usize>> {
    let text = text.trim();
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    if !inner.starts_with(char::is_whitespace) {
        return None;
    }
    inner
        .split(',')
        .map(|d| d.trim().parse::<usize>().ok())
        .collect()
}

fn classify_word(word: &str) -> Token {
    if word.parse::<i64>().is_ok() {
        return Token::IntegerValue(word.to_string());
    }
    let numeric_start = word
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'));
    if numeric_start && word.parse::<f64>().is_ok() {
        return Token::FloatValue(word.to_string());
    }
    Token::LabelValue(word.to_string())
}
