//! Slash-delimited command paths and their nested-JSON wire form.
//!
//! SSC addresses every parameter with a hierarchical path such as
//! `/rx1/sync_settings/trim`. On the wire a single-field write is a nested
//! object containing only that field, so omitted keys mean "no change":
//!
//! ```text
//! /rx1/mute + true  →  {"rx1":{"mute":true}}
//! /device/name + null  →  {"device":{"name":null}}   (a read request)
//! ```

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{kind_of, CodecError, CodecResult};

/// A parsed, non-empty SSC command path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandPath {
    segments: Vec<String>,
}

impl CommandPath {
    /// Parse a slash-delimited path. Empty segments are skipped, so
    /// `"/rx1//mute/"` and `"rx1/mute"` are the same path.
    pub fn parse(path: &str) -> CodecResult<Self> {
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(CodecError::EmptyPath);
        }

        Ok(Self { segments })
    }

    /// Build a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(Into::into)
            .filter(|segment: &String| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(CodecError::EmptyPath);
        }

        Ok(Self { segments })
    }

    /// The individual path segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append one segment, returning the longer path.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        let segment = segment.into();
        if !segment.is_empty() {
            segments.push(segment);
        }
        Self { segments }
    }

    /// Last segment of the path (the field name).
    pub fn leaf(&self) -> &str {
        // Construction guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for CommandPath {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Encode
// ============================================================================

/// Fold a path and a value into the minimal nested document that sets it.
pub fn encode(path: &CommandPath, value: Value) -> Value {
    path.segments
        .iter()
        .rev()
        .fold(value, |inner, segment| {
            let mut level = Map::new();
            level.insert(segment.clone(), inner);
            Value::Object(level)
        })
}

/// Convenience wrapper around [`encode`] for string paths.
pub fn encode_str(path: &str, value: Value) -> CodecResult<Value> {
    Ok(encode(&CommandPath::parse(path)?, value))
}

/// Serialize a document to the UTF-8 bytes sent on the wire.
pub fn to_wire(document: &Value) -> Vec<u8> {
    document.to_string().into_bytes()
}

// ============================================================================
// Decode
// ============================================================================

/// Parse an inbound payload into a JSON object.
///
/// Both protocol generations only ever push objects; anything else is a
/// malformed message and is rejected as a whole.
pub fn decode_payload(payload: &[u8]) -> CodecResult<Map<String, Value>> {
    let text =
        std::str::from_utf8(payload).map_err(|e| CodecError::InvalidUtf8(e.to_string()))?;
    decode_str(text)
}

/// Parse an inbound text payload into a JSON object.
pub fn decode_str(text: &str) -> CodecResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| CodecError::JsonDeserializationFailed(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(CodecError::NotAnObject(kind_of(&other))),
    }
}

/// Walk a document along a path.
///
/// Returns `Some` whenever the key exists, including when its value is
/// `null`, `false`, `0` or `""`; presence is what matters, not truthiness.
pub fn lookup<'a>(document: &'a Value, path: &CommandPath) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(document, |level, segment| level.as_object()?.get(segment))
}

/// Every populated leaf of a document with the path that reaches it.
///
/// Objects are descended into; every other value (arrays included) is a
/// leaf. Empty objects contribute nothing.
pub fn leaves(document: &Value) -> Vec<(CommandPath, &Value)> {
    fn walk<'a>(prefix: &mut Vec<String>, value: &'a Value, out: &mut Vec<(CommandPath, &'a Value)>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    prefix.push(key.clone());
                    walk(prefix, child, out);
                    prefix.pop();
                }
            }
            leaf => {
                if !prefix.is_empty() {
                    out.push((
                        CommandPath {
                            segments: prefix.clone(),
                        },
                        leaf,
                    ));
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(&mut Vec::new(), document, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("/rx1/mute", json!(true), json!({"rx1": {"mute": true}}))]
    #[case("/device/name", Value::Null, json!({"device": {"name": null}}))]
    #[case("device/network/ipv4/auto", json!(false), json!({"device": {"network": {"ipv4": {"auto": false}}}}))]
    #[case("/rx2/sync_settings/trim", json!(-6), json!({"rx2": {"sync_settings": {"trim": -6}}}))]
    fn test_encode_nests_value_at_path(#[case] path: &str, #[case] value: Value, #[case] expected: Value) {
        assert_eq!(encode_str(path, value).unwrap(), expected);
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let a = CommandPath::parse("/rx1//mute/").unwrap();
        let b = CommandPath::parse("rx1/mute").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "/rx1/mute");
        assert_eq!(a.leaf(), "mute");
    }

    #[test]
    fn test_parse_rejects_empty_path() {
        assert_eq!(CommandPath::parse(""), Err(CodecError::EmptyPath));
        assert_eq!(CommandPath::parse("///"), Err(CodecError::EmptyPath));
    }

    #[test]
    fn test_lookup_treats_falsy_values_as_present() {
        let doc = json!({"rx1": {"mute": false, "gain": 0, "name": ""}});
        for field in ["mute", "gain", "name"] {
            let path = CommandPath::parse("/rx1").unwrap().join(field);
            assert!(lookup(&doc, &path).is_some(), "{} should be present", field);
        }
        let missing = CommandPath::parse("/rx1/frequency").unwrap();
        assert!(lookup(&doc, &missing).is_none());
    }

    #[test]
    fn test_decode_payload_rejects_non_objects() {
        assert!(matches!(decode_payload(b"[1,2]"), Err(CodecError::NotAnObject("array"))));
        assert!(matches!(
            decode_payload(b"{not json"),
            Err(CodecError::JsonDeserializationFailed(_))
        ));
        assert!(matches!(decode_payload(&[0xff, 0xfe]), Err(CodecError::InvalidUtf8(_))));
    }

    #[test]
    fn test_to_wire_is_compact_json() {
        let doc = encode_str("/rx1/mute", json!(true)).unwrap();
        assert_eq!(to_wire(&doc), br#"{"rx1":{"mute":true}}"#.to_vec());
    }

    fn segment_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,11}"
    }

    fn scalar_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[ -~]{0,16}".prop_map(Value::String),
        ]
    }

    proptest! {
        /// Encoding then decoding yields exactly one populated leaf, at the
        /// encoded path, holding the encoded value.
        #[test]
        fn prop_encode_decode_single_leaf(
            segments in prop::collection::vec(segment_strategy(), 1..6),
            value in scalar_strategy(),
        ) {
            let path = CommandPath::from_segments(segments).unwrap();
            let wire = to_wire(&encode(&path, value.clone()));
            let decoded = Value::Object(decode_payload(&wire).unwrap());

            let leaves = leaves(&decoded);
            prop_assert_eq!(leaves.len(), 1);
            prop_assert_eq!(&leaves[0].0, &path);
            prop_assert_eq!(leaves[0].1, &value);
            prop_assert_eq!(lookup(&decoded, &path), Some(&value));
        }
    }
}
