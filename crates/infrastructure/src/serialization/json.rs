//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to deterministic JSON.
///
/// Output format:
/// - 2-space indentation
/// - Trailing newline
/// - Keys sorted alphabetically (requires `BTreeMap` in source types)
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_stable_serialization_format() {
        let mut properties = BTreeMap::new();
        properties.insert("PORT", "4004");
        properties.insert("DB_URL", "jdbc:hana:host");

        let json = to_json_stable(&properties).expect("serialization should work");
        assert_eq!(
            json,
            "{\n  \"DB_URL\": \"jdbc:hana:host\",\n  \"PORT\": \"4004\"\n}\n"
        );
    }

    #[test]
    fn test_empty_map() {
        let properties: BTreeMap<String, String> = BTreeMap::new();
        assert_eq!(to_json_stable(&properties).unwrap(), "{}\n");
    }
}
