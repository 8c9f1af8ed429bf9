//! MTA deployment descriptor model
//!
//! Mirrors the `mta.yaml` document: modules, resources and the
//! requires/provides relationships between them.

mod extension;

use serde::{Deserialize, Serialize};

use crate::value::{
    PropertyMap, deserialize_property_map, deserialize_scalar_string, null_as_default,
};

pub use extension::{ExtensionDescriptor, ModuleExtension, ResourceExtension, order_extensions};

/// Resource type of configuration resources bound through a provider.
pub const CONFIGURATION_RESOURCE_TYPE: &str = "configuration";

/// Parameter naming the provider of a configuration resource.
pub const PROVIDER_ID_PARAMETER: &str = "provider-id";

/// A parsed MTA deployment descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Schema version of the descriptor format.
    #[serde(
        rename = "_schema-version",
        default,
        deserialize_with = "deserialize_scalar_string"
    )]
    pub schema_version: String,

    /// Application identifier.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Application version.
    #[serde(
        default,
        deserialize_with = "deserialize_scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub version: String,

    /// Deployable modules.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<Module>,

    /// External resources.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,

    /// Global parameters.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,
}

impl Descriptor {
    /// Creates an empty descriptor with the given ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Finds a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Finds a module by name for modification.
    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.name == name)
    }

    /// Finds a resource by name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Finds a resource by name for modification.
    pub fn resource_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.name == name)
    }

    /// Returns the names of all modules, in declaration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }

    /// Returns the names of all resources, in declaration order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.name.as_str())
    }
}

/// A deployable unit of the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module name, unique within the descriptor.
    pub name: String,

    /// Module type (e.g. `nodejs`, `java`).
    #[serde(rename = "type", default)]
    pub module_type: String,

    /// Path of the module sources, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Properties exposed to the module at runtime.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub properties: PropertyMap,

    /// Deployment parameters.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,

    /// Dependencies on provided property sets or resources.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requires>,

    /// Property sets published to other modules.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Provides>,
}

impl Module {
    /// Creates a module with the given name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_type: module_type.into(),
            ..Self::default()
        }
    }

    /// Finds a requires entry by name.
    #[must_use]
    pub fn requires(&self, name: &str) -> Option<&Requires> {
        self.requires.iter().find(|r| r.name == name)
    }

    /// Finds a provides entry by name.
    #[must_use]
    pub fn provides(&self, name: &str) -> Option<&Provides> {
        self.provides.iter().find(|p| p.name == name)
    }
}

/// A reference from a module to a provides entry or a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requires {
    /// Name of the required provides entry or resource.
    pub name: String,

    /// Optional group collecting several requires entries into one array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Properties exposed under this dependency.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub properties: PropertyMap,

    /// Parameters of this dependency.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,
}

impl Requires {
    /// Creates a requires entry referencing `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A named property set published by a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provides {
    /// Name under which the properties are published.
    pub name: String,

    /// Published properties.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub properties: PropertyMap,
}

impl Provides {
    /// Creates a provides entry with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// An external dependency, typically a backing service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name, unique within the descriptor.
    pub name: String,

    /// Resource type (e.g. `org.cloudfoundry.managed-service`).
    #[serde(rename = "type", default)]
    pub resource_type: String,

    /// Properties exposed to requiring modules.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub properties: PropertyMap,

    /// Deployment parameters.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,
}

impl Resource {
    /// Creates a resource with the given name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Returns true for resources of type `configuration`.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        self.resource_type == CONFIGURATION_RESOURCE_TYPE
    }

    /// Returns the `provider-id` parameter when it is a string.
    #[must_use]
    pub fn provider_id(&self) -> Option<&str> {
        self.parameters
            .get(PROVIDER_ID_PARAMETER)
            .and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MTA_YAML: &str = r#"
_schema-version: 3.1
ID: bookshop
version: 1.0.0
parameters:
  deploy_mode: html5-repo
modules:
  - name: srv
    type: nodejs
    path: gen/srv
    properties:
      DB_URL: ~{db/url}
      1: numeric-key
    requires:
      - name: db
        group: SERVICES
        properties:
          url: ~{url}
    provides:
      - name: srv-api
        properties:
          srv-url: ${default-url}
  - name: ui
    type: html5
    requires:
resources:
  - name: db
    type: org.cloudfoundry.managed-service
    properties:
      url: jdbc:hana
    parameters:
      service: hana
"#;

    #[test]
    fn test_parse_descriptor() {
        let descriptor: Descriptor = serde_yaml::from_str(MTA_YAML).unwrap();

        assert_eq!(descriptor.schema_version, "3.1");
        assert_eq!(descriptor.id, "bookshop");
        assert_eq!(descriptor.version, "1.0.0");
        assert_eq!(descriptor.parameters["deploy_mode"], json!("html5-repo"));
        assert_eq!(
            descriptor.module_names().collect::<Vec<_>>(),
            vec!["srv", "ui"]
        );
        assert_eq!(descriptor.resource_names().collect::<Vec<_>>(), vec!["db"]);

        let srv = descriptor.module("srv").unwrap();
        assert_eq!(srv.path.as_deref(), Some("gen/srv"));
        assert_eq!(srv.properties["1"], json!("numeric-key"));
        assert_eq!(srv.requires("db").unwrap().group.as_deref(), Some("SERVICES"));
        assert!(srv.provides("srv-api").is_some());

        let ui = descriptor.module("ui").unwrap();
        assert!(ui.requires.is_empty());
        assert!(ui.properties.is_empty());
    }

    #[test]
    fn test_lookup_missing() {
        let descriptor: Descriptor = serde_yaml::from_str(MTA_YAML).unwrap();
        assert!(descriptor.module("nope").is_none());
        assert!(descriptor.resource("srv").is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let original: Descriptor = serde_yaml::from_str(MTA_YAML).unwrap();
        let mut copy = original.clone();
        copy.module_mut("srv")
            .unwrap()
            .properties
            .insert("DB_URL".to_string(), json!("changed"));

        assert_eq!(
            original.module("srv").unwrap().properties["DB_URL"],
            json!("~{db/url}")
        );
    }

    #[test]
    fn test_configuration_resource() {
        let mut resource = Resource::new("cfg", CONFIGURATION_RESOURCE_TYPE);
        assert!(resource.is_configuration());
        assert_eq!(resource.provider_id(), None);

        resource
            .parameters
            .insert(PROVIDER_ID_PARAMETER.to_string(), json!("com.sap.x:id"));
        assert_eq!(resource.provider_id(), Some("com.sap.x:id"));
    }
}
