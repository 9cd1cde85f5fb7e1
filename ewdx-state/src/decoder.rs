//! Message decoder - applies inbound device messages to the DeviceState
//!
//! A decoder walks one inbound JSON object and copies every present leaf it
//! knows into the [`DeviceState`]. Decoding is partial: keys that are absent
//! (or `null`) leave the corresponding field untouched, so applying the same
//! message twice is a no-op the second time.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::model::DeviceState;

/// Part of the model a decoded field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Device,
    Network,
    Dante,
    /// Zero-based receiver channel
    Channel(usize),
    /// Zero-based paired transmitter
    Transmitter(usize),
    /// Zero-based charging bay
    Bay(usize),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Device => write!(f, "device"),
            Section::Network => write!(f, "network"),
            Section::Dante => write!(f, "dante"),
            Section::Channel(i) => write!(f, "rx{}", i + 1),
            Section::Transmitter(i) => write!(f, "tx{}", i + 1),
            Section::Bay(i) => write!(f, "bay{}", i + 1),
        }
    }
}

/// What applying one message changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    sections: BTreeSet<Section>,
    skipped: Vec<String>,
}

impl DecodeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections with at least one field whose value actually changed
    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.sections.iter().copied()
    }

    /// Keys that were present but could not be interpreted
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn has_changes(&self) -> bool {
        !self.sections.is_empty()
    }

    pub fn mark(&mut self, section: Section) {
        self.sections.insert(section);
    }

    pub fn skip(&mut self, key: impl Into<String>) {
        self.skipped.push(key.into());
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: DecodeReport) {
        self.sections.extend(other.sections);
        self.skipped.extend(other.skipped);
    }

    /// Copy a present value into `slot`
    ///
    /// `null` and missing values are ignored. A value the extractor rejects
    /// is recorded as `<section>.<key>` in [`skipped`](Self::skipped) and the slot is
    /// left as it was.
    pub fn apply<T, F>(
        &mut self,
        section: Section,
        key: &str,
        slot: &mut Option<T>,
        raw: Option<&Value>,
        extract: F,
    ) where
        T: PartialEq,
        F: FnOnce(&Value) -> Option<T>,
    {
        let Some(raw) = present(raw) else {
            return;
        };
        match extract(raw) {
            Some(value) => {
                if slot.as_ref() != Some(&value) {
                    *slot = Some(value);
                    self.sections.insert(section);
                }
            }
            None => self.skipped.push(format!("{}.{}", section, key)),
        }
    }
}

/// Trait for decoding one protocol generation's messages
pub trait MessageDecoder: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Apply every known field of `message` to `state`
    fn decode(&self, message: &Map<String, Value>, state: &mut DeviceState) -> DecodeReport;
}

// ============================================================================
// Field extraction helpers
// ============================================================================

/// A value that is neither missing nor `null`
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Walk nested objects by key
pub fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |level, key| level.as_object()?.get(*key))
}

/// Element `index` of a positional array
pub fn slot(value: Option<&Value>, index: usize) -> Option<&Value> {
    present(value)?.as_array()?.get(index)
}

/// Strings, with numbers rendered as text
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Booleans; devices sometimes send 0/1
pub fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// A flag that is set whenever the device reports something non-empty
///
/// Used for warning fields where the device sends `""` for "no warning".
pub fn nonempty(value: &Value) -> Option<bool> {
    match value {
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(items) => Some(!items.is_empty()),
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

/// Integers; fractional numbers are rounded
pub fn int(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

/// A list of strings
pub fn text_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
