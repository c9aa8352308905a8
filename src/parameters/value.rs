//! Parameter values and the per-slot value chain.
//!
//! Each value keeps exactly the text it was read from. Numeric projections are
//! computed on demand, so a value is readable as string, integer or float
//! regardless of how it was declared:
//!
//! | Variant | `as_int` | `as_float` |
//! |---------|----------|------------|
//! | `String`, `Label` | text length | text length |
//! | `Integer` | leading integer of the text | `as_int` widened |
//! | `Float` | `floor(x + 0.5)` | leading float of the text |
//! | `Unset` | 0 | 0.0 |

use std::fmt;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Slot allocated but never assigned
    #[default]
    Unset,
    /// Quoted string, stored without the surrounding `<` `>`
    String(String),
    /// Bare word such as `Yes` or `GO_16BIT_SGN_INT`
    Label(String),
    /// Integer literal, stored as written
    Integer(String),
    /// Floating-point literal, stored as written
    Float(String),
}

impl Value {
    /// Integer value from a number (rendered in canonical decimal form)
    pub fn integer(v: i64) -> Self {
        Value::Integer(v.to_string())
    }

    /// Float value from a number (rendered with the shortest exact representation)
    pub fn float(v: f64) -> Self {
        Value::Float(v.to_string())
    }

    /// Whether the value has been assigned
    pub fn is_set(&self) -> bool {
        !matches!(self, Value::Unset)
    }

    /// Whether the value renders inside `<` `>`
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Canonical text of the value
    pub fn as_str(&self) -> &str {
        match self {
            Value::Unset => "",
            Value::String(s) | Value::Label(s) | Value::Integer(s) | Value::Float(s) => s,
        }
    }

    /// Integer projection
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Unset => 0,
            Value::String(s) | Value::Label(s) => s.len() as i64,
            Value::Integer(s) => parse_leading_int(s),
            Value::Float(s) => (parse_leading_float(s) + 0.5).floor() as i64,
        }
    }

    /// Float projection
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Unset => 0.0,
            Value::String(s) | Value::Label(s) => s.len() as f64,
            Value::Integer(s) => parse_leading_int(s) as f64,
            Value::Float(s) => parse_leading_float(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "<{}>", s),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Integer prefix of `text`, 0 if there is none
fn parse_leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let end = numeric_prefix_len(trimmed, false);
    trimmed[..end].parse().unwrap_or(0)
}

/// Float prefix of `text`, 0.0 if there is none
fn parse_leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    if let Ok(v) = trimmed.trim_end().parse::<f64>() {
        if v.is_finite() {
            return v;
        }
    }
    let end = numeric_prefix_len(trimmed, true);
    trimmed[..end].parse().unwrap_or(0.0)
}

fn numeric_prefix_len(text: &str, fractional: bool) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if !fractional {
        return i;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            i = j;
        }
    }
    i
}

/// One array position of a parameter.
///
/// The head is the slot's own value; further values appended while the slot is
/// already set extend the chain behind it (a parenthesised group in the source).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueSlot {
    chain: Vec<Value>,
}

impl ValueSlot {
    /// Create an unset slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the head value, leaving any chained values in place
    pub fn set_value(&mut self, value: Value) {
        match self.chain.first_mut() {
            Some(head) => *head = value,
            None => self.chain.push(value),
        }
    }

    /// Set the head if the slot is unset, otherwise append to the chain
    pub fn append_value(&mut self, value: Value) {
        if self.is_set() {
            self.chain.push(value);
        } else {
            self.set_value(value);
        }
    }

    /// Whether the head value has been assigned
    pub fn is_set(&self) -> bool {
        self.chain.first().is_some_and(Value::is_set)
    }

    /// Head value (`Unset` for an empty slot)
    pub fn head(&self) -> &Value {
        static UNSET: Value = Value::Unset;
        self.chain.first().unwrap_or(&UNSET)
    }

    /// Number of values in the chain, head included
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain holds no values
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Whether the slot holds a parenthesised group
    pub fn is_multi_value(&self) -> bool {
        self.chain.len() > 1
    }

    /// Value at `index` in the chain
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.chain.get(index)
    }

    /// First value in the chain
    pub fn first(&self) -> Option<&Value> {
        self.chain.first()
    }

    /// Last value in the chain
    pub fn last(&self) -> Option<&Value> {
        self.chain.last()
    }

    /// Value following `index`
    pub fn next(&self, index: usize) -> Option<&Value> {
        index.checked_add(1).and_then(|i| self.chain.get(i))
    }

    /// Value preceding `index`
    pub fn previous(&self, index: usize) -> Option<&Value> {
        index.checked_sub(1).and_then(|i| self.chain.get(i))
    }

    /// Iterate over the chain, head first
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.chain.iter()
    }
}

impl<'a> IntoIterator for &'a ValueSlot {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.chain.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_projections() {
        let v = Value::Integer("42".to_string());
        assert_eq!(v.as_int(), 42);
        assert_eq!(v.as_float(), 42.0);

        let v = Value::Float("2.5".to_string());
        assert_eq!(v.as_int(), 3);
        assert!((v.as_float() - 2.5).abs() < 1e-12);

        let v = Value::Float("-2.5".to_string());
        assert_eq!(v.as_int(), -2);

        let v = Value::Float("1e-3".to_string());
        assert!((v.as_float() - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_text_values_project_length() {
        let v = Value::String("Bruker:FLASH".to_string());
        assert_eq!(v.as_int(), 12);
        assert_eq!(v.as_float(), 12.0);
        assert_eq!(Value::Label("Yes".to_string()).as_int(), 3);
        assert_eq!(Value::Unset.as_int(), 0);
    }

    #[test]
    fn test_leading_number_prefix() {
        assert_eq!(Value::Integer("12abc".to_string()).as_int(), 12);
        assert_eq!(Value::Integer("abc".to_string()).as_int(), 0);
        assert!((Value::Float("3.25x".to_string()).as_float() - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_slot_append_extends_chain() {
        let mut slot = ValueSlot::new();
        assert!(!slot.is_set());
        slot.append_value(Value::integer(1));
        assert_eq!(slot.len(), 1);
        slot.append_value(Value::integer(2));
        slot.append_value(Value::integer(3));
        assert_eq!(slot.len(), 3);
        assert_eq!(slot.head().as_int(), 1);
        assert!(slot.is_multi_value());
    }

    #[test]
    fn test_slot_set_replaces_head() {
        let mut slot = ValueSlot::new();
        slot.append_value(Value::integer(1));
        slot.append_value(Value::integer(2));
        slot.set_value(Value::integer(7));
        assert_eq!(slot.head().as_int(), 7);
        assert_eq!(slot.len(), 2);
    }

    #[test]
    fn test_slot_neighbours() {
        let mut slot = ValueSlot::new();
        for i in 0..3 {
            slot.append_value(Value::integer(i));
        }
        assert_eq!(slot.previous(1).map(Value::as_int), Some(0));
        assert_eq!(slot.next(1).map(Value::as_int), Some(2));
        assert!(slot.previous(0).is_none());
        assert!(slot.next(2).is_none());
        assert_eq!(slot.last().map(Value::as_int), Some(2));
    }
}
