//! Structured payload writer.
//!
//! Configuration messages embed an ordered key/value object:
//!
//! ```text
//! {"controlID":"B1","xPositionRatio":0.25,"buttonEnabled":true}
//! ```
//!
//! Entries are written in the order they are added. Non-finite floats are
//! written as `null`. The caller marks the
//! final entry, which closes the object instead of writing a separator.
//! String values are quoted but never escaped; a value containing a quote,
//! tab or newline produces an undefined payload.

use std::fmt::Write;

const OPEN: char = '{';
const CLOSE: char = '}';
const SEPARATOR: char = ',';

/// A typed value in a structured payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Int(value)
    }
}

impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        PayloadValue::Int(value.into())
    }
}

impl From<f32> for PayloadValue {
    fn from(value: f32) -> Self {
        PayloadValue::Float(value)
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Bool(value)
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Str(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Str(value)
    }
}

/// Renders a float with exactly two decimals.
pub(crate) fn format_float(value: f32) -> String {
    format!("{:.2}", value)
}

/// Writes an ordered key/value object one entry at a time.
#[derive(Debug)]
pub struct StructuredPayloadWriter {
    buf: String,
    entries: usize,
    closed: bool,
}

impl StructuredPayloadWriter {
    pub fn new() -> Self {
        let mut buf = String::with_capacity(256);
        buf.push(OPEN);
        Self {
            buf,
            entries: 0,
            closed: false,
        }
    }

    /// Appends an entry. `last` closes the object.
    pub fn add(&mut self, key: &str, value: impl Into<PayloadValue>, last: bool) -> &mut Self {
        debug_assert!(!self.closed, "entry '{}' added after the final entry", key);

        let _ = write!(self.buf, "\"{}\":", key);
        match value.into() {
            PayloadValue::Int(v) => {
                let _ = write!(self.buf, "{}", v);
            }
            // NaN and infinities have no JSON form.
            PayloadValue::Float(v) if !v.is_finite() => self.buf.push_str("null"),
            PayloadValue::Float(v) => self.buf.push_str(&format_float(v)),
            PayloadValue::Bool(v) => self.buf.push_str(if v { "true" } else { "false" }),
            PayloadValue::Str(v) => {
                self.buf.push('"');
                self.buf.push_str(&v);
                self.buf.push('"');
            }
        }
        self.entries += 1;

        if last {
            self.buf.push(CLOSE);
            self.closed = true;
        } else {
            self.buf.push(SEPARATOR);
        }
        self
    }

    pub fn add_int(&mut self, key: &str, value: i64, last: bool) -> &mut Self {
        self.add(key, PayloadValue::Int(value), last)
    }

    pub fn add_float(&mut self, key: &str, value: f32, last: bool) -> &mut Self {
        self.add(key, PayloadValue::Float(value), last)
    }

    pub fn add_bool(&mut self, key: &str, value: bool, last: bool) -> &mut Self {
        self.add(key, PayloadValue::Bool(value), last)
    }

    pub fn add_str(&mut self, key: &str, value: &str, last: bool) -> &mut Self {
        self.add(key, value, last)
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Whether the final entry has been written.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the rendered object.
    pub fn finish(self) -> String {
        debug_assert!(self.closed, "structured payload finished without a final entry");
        self.buf
    }
}

impl Default for StructuredPayloadWriter {
    fn default() -> Self {
        Self::new()
    }
}
