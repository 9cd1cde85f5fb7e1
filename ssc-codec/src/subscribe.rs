//! Generation-1 subscription documents.
//!
//! A receiver only pushes state for leaves that a client has subscribed to,
//! and each subscription carries a lease that has to be renewed before it
//! runs out. The request is itself an SSC document:
//!
//! ```text
//! {"osc":{"state":{"subscribe":[{"#":{"lifetime":60}, "rx1":{"mute":null}}]}}}
//! ```
//!
//! Templates list every subscribed leaf with a `null` value. They are built
//! from path lists with [`template`] so the same paths can be reused for
//! `null`-valued reads.

use serde_json::{Map, Value};

use crate::error::CodecResult;
use crate::path::{encode, CommandPath};

/// Deep-merge `other` into `target`.
///
/// Objects are merged key by key; any other value in `other` replaces what
/// was in `target`.
pub fn merge(target: &mut Value, other: Value) {
    match (target, other) {
        (Value::Object(into), Value::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Build a nested template with a `null` leaf for every path.
pub fn template<I, S>(paths: I) -> CodecResult<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut document = Value::Object(Map::new());
    for path in paths {
        let path = CommandPath::parse(path.as_ref())?;
        merge(&mut document, encode(&path, Value::Null));
    }
    Ok(document)
}

/// Nest a template under a prefix path, e.g. `mates/tx1`.
pub fn nest(prefix: &str, inner: Value) -> CodecResult<Value> {
    Ok(encode(&CommandPath::parse(prefix)?, inner))
}

/// One element of the `subscribe` array.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionEntry {
    /// Lease lifetime in seconds; entries without one inherit the device default.
    pub lifetime: Option<u32>,
    /// The subscribed leaves.
    pub template: Value,
}

impl SubscriptionEntry {
    /// Entry with an explicit lease lifetime.
    pub fn with_lifetime(lifetime: u32, template: Value) -> Self {
        Self {
            lifetime: Some(lifetime),
            template,
        }
    }

    /// Entry without a `#` block.
    pub fn without_lifetime(template: Value) -> Self {
        Self {
            lifetime: None,
            template,
        }
    }

    fn into_value(self) -> Value {
        let mut entry = match self.template {
            Value::Object(map) => map,
            other => {
                // Non-object templates cannot carry the lifetime block
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        if let Some(lifetime) = self.lifetime {
            let mut meta = Map::new();
            meta.insert("lifetime".to_string(), Value::from(lifetime));
            entry.insert("#".to_string(), Value::Object(meta));
        }

        Value::Object(entry)
    }
}

/// Wrap subscription entries in the `osc/state/subscribe` envelope.
pub fn subscribe_document(entries: Vec<SubscriptionEntry>) -> Value {
    let list: Vec<Value> = entries.into_iter().map(SubscriptionEntry::into_value).collect();
    ["subscribe", "state", "osc"]
        .iter()
        .fold(Value::Array(list), |inner, key| {
            let mut level = Map::new();
            level.insert((*key).to_string(), inner);
            Value::Object(level)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_merges_shared_prefixes() {
        let doc = template(["/rx1/mute", "/rx1/sync_settings/trim", "/rx1/sync_settings/led"]).unwrap();
        assert_eq!(
            doc,
            json!({"rx1": {"mute": null, "sync_settings": {"trim": null, "led": null}}})
        );
    }

    #[test]
    fn test_merge_replaces_scalars_and_merges_objects() {
        let mut target = json!({"a": {"b": 1, "c": 2}});
        merge(&mut target, json!({"a": {"c": 3, "d": 4}}));
        assert_eq!(target, json!({"a": {"b": 1, "c": 3, "d": 4}}));
    }

    #[test]
    fn test_subscribe_document_shape() {
        let doc = subscribe_document(vec![
            SubscriptionEntry::with_lifetime(60, template(["/rx1/mute"]).unwrap()),
            SubscriptionEntry::without_lifetime(template(["/m/rx1/divi"]).unwrap()),
        ]);

        assert_eq!(
            doc,
            json!({"osc": {"state": {"subscribe": [
                {"#": {"lifetime": 60}, "rx1": {"mute": null}},
                {"m": {"rx1": {"divi": null}}}
            ]}}})
        );
    }

    #[test]
    fn test_nest_under_prefix() {
        let inner = template(["/battery/gauge"]).unwrap();
        assert_eq!(
            nest("mates/tx2", inner).unwrap(),
            json!({"mates": {"tx2": {"battery": {"gauge": null}}}})
        );
    }
}
