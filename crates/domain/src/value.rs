//! Canonical property values
//!
//! Descriptor properties and parameters are dynamic trees. They are stored as
//! [`serde_json::Value`] with string keys only; YAML mappings with non-string
//! keys are converted once, while deserializing.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde_json::{Map, Number, Value};
use serde_yaml::{Mapping, Value as YamlValue};

/// A string-keyed mapping of dynamic values.
pub type PropertyMap = Map<String, Value>;

/// Converts a YAML value into the canonical value representation.
///
/// Mapping keys that are not strings are stringified, tags are dropped.
#[must_use]
pub fn canonicalize(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => canonical_number(&n),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        YamlValue::Mapping(mapping) => Value::Object(canonicalize_mapping(mapping)),
        YamlValue::Tagged(tagged) => canonicalize(tagged.value),
    }
}

/// Converts a YAML mapping into a [`PropertyMap`].
#[must_use]
pub fn canonicalize_mapping(mapping: Mapping) -> PropertyMap {
    mapping
        .into_iter()
        .map(|(key, value)| (key_to_string(key), canonicalize(value)))
        .collect()
}

fn canonical_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        // .inf and .nan have no JSON form
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::String(n.to_string()), Value::Number)
    }
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        other => value_to_string(&canonicalize(other)),
    }
}

/// Renders a value the way it is spliced into strings and exposed as an
/// environment variable: strings verbatim, anything else as compact JSON.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Deserializes a property or parameter mapping.
///
/// A missing or null mapping yields an empty map.
///
/// # Errors
///
/// Returns an error if the value is present but is not a mapping.
pub fn deserialize_property_map<'de, D>(deserializer: D) -> Result<PropertyMap, D::Error>
where
    D: Deserializer<'de>,
{
    match YamlValue::deserialize(deserializer)? {
        YamlValue::Null => Ok(PropertyMap::new()),
        YamlValue::Mapping(mapping) => Ok(canonicalize_mapping(mapping)),
        YamlValue::Tagged(tagged) => match tagged.value {
            YamlValue::Mapping(mapping) => Ok(canonicalize_mapping(mapping)),
            _ => Err(D::Error::custom("expected a mapping")),
        },
        _ => Err(D::Error::custom("expected a mapping")),
    }
}

/// Deserializes any scalar as a string, so that unquoted values such as
/// `_schema-version: 3.1` are accepted.
///
/// # Errors
///
/// Returns an error if the value is a mapping or a sequence.
pub fn deserialize_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match YamlValue::deserialize(deserializer)? {
        YamlValue::Null => Ok(String::new()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected a scalar value")),
    }
}

/// Deserializes a value whose null form means "default", e.g. `requires:`
/// with no entries.
///
/// # Errors
///
/// Returns an error if the inner value cannot be deserialized.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deep-merges `overlay` into `base`: nested mappings merge key by key, any
/// other value in the overlay replaces the base value.
pub fn merge_maps(base: &mut PropertyMap, overlay: &PropertyMap) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_maps(existing, nested),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
