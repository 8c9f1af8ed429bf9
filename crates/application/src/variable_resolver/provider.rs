//! Provider lookup
//!
//! A provider is whoever declares a named capability: a module's provides
//! entry or a resource. Module provides entries are searched first.

use mta_domain::descriptor::{Descriptor, Provides, Resource};
use mta_domain::value::PropertyMap;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProviderKind<'a> {
    Module(&'a Provides),
    Resource(&'a Resource),
}

/// A borrowed view of the entity declaring a capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderSource<'a> {
    kind: ProviderKind<'a>,
}

impl<'a> ProviderSource<'a> {
    /// Wraps a module provides entry.
    #[must_use]
    pub const fn from_provides(provides: &'a Provides) -> Self {
        Self {
            kind: ProviderKind::Module(provides),
        }
    }

    /// Wraps a resource.
    #[must_use]
    pub const fn from_resource(resource: &'a Resource) -> Self {
        Self {
            kind: ProviderKind::Resource(resource),
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self.kind {
            ProviderKind::Module(provides) => &provides.name,
            ProviderKind::Resource(resource) => &resource.name,
        }
    }

    /// Returns the declared properties.
    #[must_use]
    pub fn properties(&self) -> &'a PropertyMap {
        match self.kind {
            ProviderKind::Module(provides) => &provides.properties,
            ProviderKind::Resource(resource) => &resource.properties,
        }
    }

    /// Returns the declared parameters; only resources carry them.
    #[must_use]
    pub const fn parameters(&self) -> Option<&'a PropertyMap> {
        match self.kind {
            ProviderKind::Module(_) => None,
            ProviderKind::Resource(resource) => Some(&resource.parameters),
        }
    }

    /// Returns the `provider-id` of a configuration resource.
    #[must_use]
    pub fn configuration_provider_id(&self) -> Option<&'a str> {
        match self.kind {
            ProviderKind::Resource(resource) if resource.is_configuration() => {
                resource.provider_id()
            }
            _ => None,
        }
    }
}

/// Finds the provider named `name`.
///
/// Provides entries of all modules are searched before resources; the first
/// match wins.
#[must_use]
pub fn find_provider<'a>(descriptor: &'a Descriptor, name: &str) -> Option<ProviderSource<'a>> {
    descriptor
        .modules
        .iter()
        .flat_map(|module| module.provides.iter())
        .find(|provides| provides.name == name)
        .map(ProviderSource::from_provides)
        .or_else(|| {
            descriptor
                .resource(name)
                .map(ProviderSource::from_resource)
        })
}
