//! Resolution context for placeholder substitution
//!
//! Holds externally supplied values (process environment, `.env` files,
//! service bindings) partitioned into a global tier and per-entity tiers.

use std::collections::HashMap;

use crate::descriptor::Descriptor;

/// Global key holding the service-binding catalog.
pub const SERVICE_BINDINGS_KEY: &str = "VCAP_SERVICES";

/// Entity key receiving the bound service instance name.
pub const SERVICE_NAME_KEY: &str = "service-name";

/// A flat string-to-string scope.
pub type ValueScope = HashMap<String, String>;

/// Layered lookup table built once per resolution run.
///
/// Every module and resource of the descriptor owns a scope, allocated up
/// front by [`ResolutionContext::for_descriptor`]. Keys of the form
/// `entity/key` are routed into the entity's scope when such an entity exists;
/// everything else lands in the global scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    global: ValueScope,
    modules: HashMap<String, ValueScope>,
    resources: HashMap<String, ValueScope>,
}

impl ResolutionContext {
    /// Creates a context with an empty scope for every module and resource.
    #[must_use]
    pub fn for_descriptor(descriptor: &Descriptor) -> Self {
        Self {
            global: ValueScope::new(),
            modules: descriptor
                .module_names()
                .map(|name| (name.to_string(), ValueScope::new()))
                .collect(),
            resources: descriptor
                .resource_names()
                .map(|name| (name.to_string(), ValueScope::new()))
                .collect(),
        }
    }

    /// Inserts an entry, routing `entity/key` names into entity scopes.
    ///
    /// Key and value are trimmed. Module names are matched before resource
    /// names; a prefix naming no entity keeps the whole key in the global scope.
    pub fn insert(&mut self, key: &str, value: &str) {
        let key = key.trim();
        let value = value.trim().to_string();

        if let Some((entity, entity_key)) = key.split_once('/') {
            if let Some(scope) = self.modules.get_mut(entity) {
                scope.insert(entity_key.to_string(), value);
                return;
            }
            if let Some(scope) = self.resources.get_mut(entity) {
                scope.insert(entity_key.to_string(), value);
                return;
            }
        }

        self.global.insert(key.to_string(), value);
    }

    /// Inserts every entry of `entries` with [`ResolutionContext::insert`].
    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in entries {
            self.insert(key.as_ref(), value.as_ref());
        }
    }

    /// Sets a value in a resource scope. Returns false if no such resource
    /// scope exists.
    pub fn set_resource_value(&mut self, resource: &str, key: &str, value: &str) -> bool {
        self.resources.get_mut(resource).is_some_and(|scope| {
            scope.insert(key.to_string(), value.to_string());
            true
        })
    }

    /// Looks up a key in the global scope.
    #[must_use]
    pub fn global_value(&self, key: &str) -> Option<&str> {
        self.global.get(key).map(String::as_str)
    }

    /// Looks up a key in a module scope.
    #[must_use]
    pub fn module_value(&self, module: &str, key: &str) -> Option<&str> {
        self.modules
            .get(module)
            .and_then(|scope| scope.get(key))
            .map(String::as_str)
    }

    /// Looks up a key in a resource scope.
    #[must_use]
    pub fn resource_value(&self, resource: &str, key: &str) -> Option<&str> {
        self.resources
            .get(resource)
            .and_then(|scope| scope.get(key))
            .map(String::as_str)
    }

    /// Looks up a key in the scope of `entity`, trying modules first.
    #[must_use]
    pub fn entity_value(&self, entity: &str, key: &str) -> Option<&str> {
        self.module_value(entity, key)
            .or_else(|| self.resource_value(entity, key))
    }
}
