//! Rendering of parameters back to vendor text.
//!
//! Plain parameters are rendered in two passes. The first writes every value
//! as newline-delimited words; the second packs those words onto lines the
//! way ParaVision does, so only line-break placement differs from the first
//! pass.

use std::fmt;

use super::document::ParameterFile;
use super::parameter::{Parameter, ParameterKind};
use super::value::ValueSlot;

/// Column budget of the vendor's fixed-width output
pub const MAX_LINE_LENGTH: usize = 79;

/// Pack newline-delimited words greedily onto lines.
///
/// A word joins the current line while the line stays shorter than `budget`;
/// otherwise it starts a new one. Empty words are dropped.
pub fn wrap_words(text: &str, budget: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut line_length = 0;
    for word in text.split('\n').filter(|w| !w.is_empty()) {
        let word_length = word.chars().count();
        if line_length > 0 && line_length + word_length >= budget {
            out.push('\n');
            line_length = 0;
        }
        out.push_str(word);
        line_length += word_length;
    }
    out
}

fn render_slot(slot: &ValueSlot, out: &mut String) {
    let multi = slot.is_multi_value();
    if multi {
        out.push_str("\n(");
    }
    let last = slot.len().saturating_sub(1);
    for (i, value) in slot.iter().enumerate() {
        if value.is_string() {
            out.push_str("\n<");
        }
        out.push_str(value.as_str());
        if value.is_string() {
            out.push_str(">\n");
        }
        if i < last {
            out.push_str(",\n \n");
        }
    }
    if multi {
        out.push_str(")\n");
    }
}

/// First-pass rendering: every slot as words, slots separated by a space word
fn render_values(parameter: &Parameter) -> String {
    let mut out = String::new();
    let slots = parameter.slots();
    for (i, slot) in slots.iter().enumerate() {
        render_slot(slot, &mut out);
        if i + 1 < slots.len() {
            out.push_str(" \n");
        } else {
            out.push('\n');
        }
    }
    out
}

fn head_text(parameter: &Parameter) -> &str {
    parameter.slot(0).map_or("", |s| s.head().as_str())
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ParameterKind::Visualization => writeln!(f, "$$ @vis= {}", head_text(self)),
            ParameterKind::Info => writeln!(f, "##{}", head_text(self)),
            ParameterKind::Plain => {
                write!(f, "##${}=", self.name())?;
                if !self.dimensions().is_empty() {
                    let dims: Vec<String> =
                        self.dimensions().iter().map(ToString::to_string).collect();
                    writeln!(f, "( {} )", dims.join(", "))?;
                }
                writeln!(f, "{}", wrap_words(&render_values(self), MAX_LINE_LENGTH))
            }
        }
    }
}

impl fmt::Display for ParameterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for parameter in self {
            write!(f, "{}", parameter)?;
        }
        Ok(())
    }
}
