//! Variable resolution engine
//!
//! Resolves `~{...}` requires-variables and `${...}` placeholders inside
//! arbitrarily nested property values.

use serde_json::Value;
use tracing::trace;

use mta_domain::context::ResolutionContext;
use mta_domain::descriptor::{Descriptor, Module, Requires};
use mta_domain::value::{PropertyMap, value_to_string};

use super::diagnostics::{Diagnostics, Unresolved};
use super::parser::{ExpressionKind, find_expression};
use super::provider::{ProviderSource, find_provider};

/// The entities a lookup is performed on behalf of.
///
/// A top-level module property is resolved with only `module` set; a property
/// of a requires entry additionally sets `requires`. Values taken from a
/// provider are resolved with only `source` set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    /// The module whose properties are being resolved.
    pub module: Option<&'a Module>,
    /// The requires entry whose properties are being resolved.
    pub requires: Option<&'a Requires>,
    /// The provider whose property value is being resolved.
    pub source: Option<ProviderSource<'a>>,
}

impl<'a> Scope<'a> {
    /// Scope for a module's own properties.
    #[must_use]
    pub const fn module(module: &'a Module) -> Self {
        Self {
            module: Some(module),
            requires: None,
            source: None,
        }
    }

    /// Scope for the properties of one of a module's requires entries.
    #[must_use]
    pub const fn requires(module: &'a Module, requires: &'a Requires) -> Self {
        Self {
            module: Some(module),
            requires: Some(requires),
            source: None,
        }
    }

    /// Scope for a value declared by a provider.
    #[must_use]
    pub const fn source(source: ProviderSource<'a>) -> Self {
        Self {
            module: None,
            requires: None,
            source: Some(source),
        }
    }
}

/// The variable resolution engine.
///
/// Lookups read the descriptor and the context; every unresolved reference is
/// recorded in the resolver's [`Diagnostics`].
pub struct VariableResolver<'a> {
    descriptor: &'a Descriptor,
    context: &'a ResolutionContext,
    diagnostics: Diagnostics,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over the given descriptor and context.
    #[must_use]
    pub fn new(descriptor: &'a Descriptor, context: &'a ResolutionContext) -> Self {
        Self {
            descriptor,
            context,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Returns the diagnostics recorded so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consumes the resolver, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Resolves every value of `properties` in place.
    ///
    /// Each string is scanned once for both expression languages, left to
    /// right. Text produced by a requires-variable is never scanned again, so
    /// placeholders left open by the provider stay as they are.
    pub fn resolve_properties(&mut self, properties: &mut PropertyMap, scope: Scope<'a>) {
        for value in properties.values_mut() {
            self.walk(value, scope, &[ExpressionKind::Variable, ExpressionKind::Placeholder]);
        }
    }

    /// Resolves one expression language throughout `value`, in place.
    ///
    /// Mappings and sequences are walked recursively, strings are scanned,
    /// and other scalars are left untouched.
    pub fn resolve_value(&mut self, value: &mut Value, scope: Scope<'a>, kind: ExpressionKind) {
        self.walk(value, scope, &[kind]);
    }

    fn walk(&mut self, value: &mut Value, scope: Scope<'a>, kinds: &[ExpressionKind]) {
        match value {
            Value::Object(map) => {
                for nested in map.values_mut() {
                    self.walk(nested, scope, kinds);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item, scope, kinds);
                }
            }
            Value::String(text) => {
                let text = std::mem::take(text);
                *value = self.substitute(text, scope, kinds);
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Replaces every expression of `kinds` in `text`, earliest first.
    ///
    /// An expression spanning the whole string is replaced by its value as
    /// is, keeping its type. Otherwise the value is spliced in as text and
    /// scanning continues after the inserted text.
    fn substitute(&mut self, mut text: String, scope: Scope<'a>, kinds: &[ExpressionKind]) -> Value {
        let mut position = 0;

        while let Some((kind, found)) = kinds
            .iter()
            .filter_map(|&kind| find_expression(&text, position, kind.prefix()).map(|m| (kind, m)))
            .min_by_key(|(_, found)| found.span.start)
        {
            let resolved = match kind {
                ExpressionKind::Variable => self.resolve_variable(scope, &found.name),
                ExpressionKind::Placeholder => self.resolve_placeholder(scope, &found.name),
            };

            if found.whole {
                return resolved;
            }

            let replacement = value_to_string(&resolved);
            text.replace_range(found.span.clone(), &replacement);
            position = found.span.start + replacement.len();
        }

        Value::String(text)
    }

    /// Resolves a requires-variable to the value of a provider property.
    ///
    /// Inside a requires entry the entry names the provider; otherwise `name`
    /// must read `provider/property`. Placeholders in the property value are
    /// resolved in the provider's own scope. When nothing is found the
    /// variable is returned as `~{property}` and a diagnostic is recorded.
    pub fn resolve_variable(&mut self, scope: Scope<'a>, name: &str) -> Value {
        let (provider_name, property) = match scope.requires {
            Some(requires) => (requires.name.as_str(), name),
            None => {
                let Some(split) = name
                    .split_once('/')
                    .filter(|(provider, _)| !provider.is_empty())
                else {
                    self.diagnostics.push(Unresolved::MissingPrefix {
                        name: name.to_string(),
                    });
                    return Value::String(ExpressionKind::Variable.literal(name));
                };
                split
            }
        };

        let provider = find_provider(self.descriptor, provider_name);

        if let Some(source) = provider
            && let Some(value) = source.properties().get(property)
        {
            trace!(provider = provider_name, property, "resolved variable");
            let mut value = value.clone();
            self.resolve_value(&mut value, Scope::source(source), ExpressionKind::Placeholder);
            return value;
        }

        match provider.and_then(|source| source.configuration_provider_id()) {
            Some(provider_id) => self.diagnostics.push(Unresolved::MissingConfiguration {
                provider: provider_name.to_string(),
                provider_id: provider_id.to_string(),
                name: property.to_string(),
            }),
            None => self.diagnostics.push(Unresolved::MissingVariable {
                provider: provider_name.to_string(),
                name: property.to_string(),
            }),
        }

        Value::String(ExpressionKind::Variable.literal(property))
    }

    /// Resolves a placeholder through the scope chain; the first hit wins:
    ///
    /// 1. the source's parameters (string values only)
    /// 2. the context scope of the source
    /// 3. the requires entry's parameters (string values only)
    /// 4. the module's parameters (string values only), then its context scope
    /// 5. the descriptor's global parameters
    /// 6. the context's global scope
    ///
    /// When nothing matches, `${name}` is returned and a diagnostic recorded.
    pub fn resolve_placeholder(&mut self, scope: Scope<'a>, name: &str) -> Value {
        if let Some(value) = self.lookup_placeholder(scope, name) {
            trace!(placeholder = name, "resolved placeholder");
            return value;
        }

        self.diagnostics.push(Unresolved::MissingParameter {
            source: scope.source.map(|source| source.name().to_string()),
            name: name.to_string(),
        });
        Value::String(ExpressionKind::Placeholder.literal(name))
    }

    fn lookup_placeholder(&self, scope: Scope<'a>, name: &str) -> Option<Value> {
        if let Some(source) = scope.source {
            if let Some(value) = source.parameters().and_then(|p| string_parameter(p, name)) {
                return Some(value);
            }
            if let Some(value) = self.context.entity_value(source.name(), name) {
                return Some(Value::String(value.to_string()));
            }
        }

        if let Some(value) = scope
            .requires
            .and_then(|requires| string_parameter(&requires.parameters, name))
        {
            return Some(value);
        }

        if let Some(module) = scope.module {
            if let Some(value) = string_parameter(&module.parameters, name) {
                return Some(value);
            }
            if let Some(value) = self.context.module_value(&module.name, name) {
                return Some(Value::String(value.to_string()));
            }
        }

        if let Some(value) = self.descriptor.parameters.get(name) {
            return Some(value.clone());
        }

        self.context
            .global_value(name)
            .map(|value| Value::String(value.to_string()))
    }
}

/// Returns a parameter only when it holds a string.
fn string_parameter(parameters: &PropertyMap, name: &str) -> Option<Value> {
    match parameters.get(name) {
        Some(Value::String(value)) => Some(Value::String(value.clone())),
        _ => None,
    }
}
