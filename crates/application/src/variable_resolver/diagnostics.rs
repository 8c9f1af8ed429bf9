//! Diagnostics for unresolved references
//!
//! Resolution never fails on a missing value. Instead each gap is described
//! by an [`Unresolved`] entry and recorded once in [`Diagnostics`].

use std::fmt;

use tracing::debug;

/// A reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// A `~{name}` variable outside a requires entry, without `provider/`.
    MissingPrefix {
        /// The variable text.
        name: String,
    },
    /// No provider, or no such property on the provider.
    MissingVariable {
        /// The provider name.
        provider: String,
        /// The property name.
        name: String,
    },
    /// A property missing on a configuration resource.
    MissingConfiguration {
        /// The configuration resource name.
        provider: String,
        /// Its `provider-id` parameter.
        provider_id: String,
        /// The property name.
        name: String,
    },
    /// A `${name}` placeholder with no value in any scope.
    MissingParameter {
        /// Name of the provider in scope, if any.
        source: Option<String>,
        /// The parameter name.
        name: String,
    },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix { name } => {
                write!(f, "missing provider prefix in variable \"~{{{name}}}\"")
            }
            Self::MissingVariable { provider, name } => {
                write!(f, "missing value for variable \"~{{{provider}/{name}}}\"")
            }
            Self::MissingConfiguration {
                provider,
                provider_id,
                name,
            } => write!(
                f,
                "missing configuration \"{name}\" of provider \"{provider}\" (provider-id \"{provider_id}\")"
            ),
            Self::MissingParameter {
                source: Some(source),
                name,
            } => write!(f, "missing value for placeholder \"${{{source}/{name}}}\""),
            Self::MissingParameter { source: None, name } => {
                write!(f, "missing value for placeholder \"${{{name}}}\"")
            }
        }
    }
}

/// Ordered, duplicate-free list of diagnostic messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the message for `entry` unless an identical one exists.
    pub fn push(&mut self, entry: impl fmt::Display) {
        let message = entry.to_string();
        if !self.messages.contains(&message) {
            debug!(%message, "unresolved reference");
            self.messages.push(message);
        }
    }

    /// Returns the recorded messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consumes the list, returning the messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Returns the number of distinct messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        assert_eq!(
            Unresolved::MissingPrefix {
                name: "url".to_string()
            }
            .to_string(),
            r#"missing provider prefix in variable "~{url}""#
        );
        assert_eq!(
            Unresolved::MissingVariable {
                provider: "db".to_string(),
                name: "url".to_string()
            }
            .to_string(),
            r#"missing value for variable "~{db/url}""#
        );
        assert_eq!(
            Unresolved::MissingConfiguration {
                provider: "cfg".to_string(),
                provider_id: "app:api".to_string(),
                name: "url".to_string()
            }
            .to_string(),
            r#"missing configuration "url" of provider "cfg" (provider-id "app:api")"#
        );
        assert_eq!(
            Unresolved::MissingParameter {
                source: Some("db".to_string()),
                name: "plan".to_string()
            }
            .to_string(),
            r#"missing value for placeholder "${db/plan}""#
        );
        assert_eq!(
            Unresolved::MissingParameter {
                source: None,
                name: "plan".to_string()
            }
            .to_string(),
            r#"missing value for placeholder "${plan}""#
        );
    }

    #[test]
    fn test_push_deduplicates() {
        let mut diagnostics = Diagnostics::new();
        let missing = Unresolved::MissingParameter {
            source: None,
            name: "x".to_string(),
        };

        diagnostics.push(&missing);
        diagnostics.push(&missing);
        diagnostics.push("other");

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.messages(),
            &[
                r#"missing value for placeholder "${x}""#.to_string(),
                "other".to_string()
            ]
        );
    }

    #[test]
    fn test_empty() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        assert!(diagnostics.into_messages().is_empty());
    }
}
