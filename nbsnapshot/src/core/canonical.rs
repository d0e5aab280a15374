//! Deterministic JSON encoding for snapshot output.
//!
//! Object keys are sorted recursively, nesting is indented by one space,
//! non-ASCII text is written as-is, and the payload ends with a newline.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

/// Serialize `value` into its canonical snapshot form.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("convert to json value")?;
    let sorted = sort_keys(value);

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    sorted
        .serialize(&mut serializer)
        .context("serialize canonical json")?;

    let mut payload = String::from_utf8(buf).context("canonical json is not utf-8")?;
    payload.push('\n');
    Ok(payload)
}

/// Rebuild every object with its keys in ascending order.
///
/// `Map` keeps insertion order when serde_json's `preserve_order` feature is
/// enabled anywhere in the build, so the order is imposed here.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
