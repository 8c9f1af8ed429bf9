//! Extension descriptors (`.mtaext`)
//!
//! An extension overlays properties and parameters onto an existing
//! descriptor. Extensions form a chain: each one extends either the base
//! descriptor or another extension, identified by ID.

use serde::{Deserialize, Serialize};

use super::{Descriptor, Provides, Requires};
use crate::error::{DomainError, DomainResult};
use crate::value::{
    PropertyMap, deserialize_property_map, deserialize_scalar_string, merge_maps,
    null_as_default,
};

/// A parsed extension descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// Schema version of the extension format.
    #[serde(
        rename = "_schema-version",
        default,
        deserialize_with = "deserialize_scalar_string"
    )]
    pub schema_version: String,

    /// Extension identifier.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// ID of the descriptor or extension this one extends.
    pub extends: String,

    /// Module overlays.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleExtension>,

    /// Resource overlays.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceExtension>,

    /// Global parameter overlays.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,
}

/// Overlay for a single module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleExtension {
    /// Name of the extended module.
    pub name: String,

    /// Property overlays.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub properties: PropertyMap,

    /// Parameter overlays.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,

    /// Requires overlays, matched by name.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requires>,

    /// Provides overlays, matched by name.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Provides>,
}

/// Overlay for a single resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceExtension {
    /// Name of the extended resource.
    pub name: String,

    /// Property overlays.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub properties: PropertyMap,

    /// Parameter overlays.
    #[serde(
        default,
        deserialize_with = "deserialize_property_map",
        skip_serializing_if = "PropertyMap::is_empty"
    )]
    pub parameters: PropertyMap,
}

/// Orders extensions into a chain starting at `base_id`.
///
/// # Errors
///
/// Returns [`DomainError::DuplicateExtends`] when two extensions extend the
/// same ID, and [`DomainError::UnknownExtends`] when an extension is not
/// reachable from the base descriptor.
pub fn order_extensions(
    base_id: &str,
    mut extensions: Vec<ExtensionDescriptor>,
) -> DomainResult<Vec<ExtensionDescriptor>> {
    for (i, first) in extensions.iter().enumerate() {
        if let Some(second) = extensions[i + 1..]
            .iter()
            .find(|other| other.extends == first.extends)
        {
            return Err(DomainError::DuplicateExtends {
                first: first.id.clone(),
                second: second.id.clone(),
                extends: first.extends.clone(),
            });
        }
    }

    let mut ordered = Vec::with_capacity(extensions.len());
    let mut current = base_id.to_string();
    while let Some(index) = extensions.iter().position(|e| e.extends == current) {
        let next = extensions.swap_remove(index);
        current.clone_from(&next.id);
        ordered.push(next);
    }

    if let Some(orphan) = extensions.into_iter().next() {
        return Err(DomainError::UnknownExtends {
            extension: orphan.id,
            extends: orphan.extends,
        });
    }

    Ok(ordered)
}

impl Descriptor {
    /// Applies a single extension on top of this descriptor.
    ///
    /// The descriptor is left partially merged when an error is returned;
    /// callers that need the original should merge into a clone.
    ///
    /// # Errors
    ///
    /// Returns an error when the extension references a module, resource,
    /// requires or provides entry that does not exist.
    pub fn apply_extension(&mut self, extension: &ExtensionDescriptor) -> DomainResult<()> {
        merge_maps(&mut self.parameters, &extension.parameters);

        for overlay in &extension.modules {
            let module = self
                .module_mut(&overlay.name)
                .ok_or_else(|| DomainError::UnknownModule {
                    extension: extension.id.clone(),
                    module: overlay.name.clone(),
                })?;

            merge_maps(&mut module.properties, &overlay.properties);
            merge_maps(&mut module.parameters, &overlay.parameters);

            for requires_overlay in &overlay.requires {
                let requires = module
                    .requires
                    .iter_mut()
                    .find(|r| r.name == requires_overlay.name)
                    .ok_or_else(|| DomainError::UnknownRequires {
                        extension: extension.id.clone(),
                        module: overlay.name.clone(),
                        requires: requires_overlay.name.clone(),
                    })?;
                merge_maps(&mut requires.properties, &requires_overlay.properties);
                merge_maps(&mut requires.parameters, &requires_overlay.parameters);
            }

            for provides_overlay in &overlay.provides {
                let provides = module
                    .provides
                    .iter_mut()
                    .find(|p| p.name == provides_overlay.name)
                    .ok_or_else(|| DomainError::UnknownProvides {
                        extension: extension.id.clone(),
                        module: overlay.name.clone(),
                        provides: provides_overlay.name.clone(),
                    })?;
                merge_maps(&mut provides.properties, &provides_overlay.properties);
            }
        }

        for overlay in &extension.resources {
            let resource =
                self.resource_mut(&overlay.name)
                    .ok_or_else(|| DomainError::UnknownResource {
                        extension: extension.id.clone(),
                        resource: overlay.name.clone(),
                    })?;
            merge_maps(&mut resource.properties, &overlay.properties);
            merge_maps(&mut resource.parameters, &overlay.parameters);
        }

        Ok(())
    }

    /// Orders the extensions into a chain and applies them in turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is broken or an extension references an
    /// unknown entity.
    pub fn merge_extensions(&mut self, extensions: Vec<ExtensionDescriptor>) -> DomainResult<()> {
        for extension in order_extensions(&self.id, extensions)? {
            self.apply_extension(&extension)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn base() -> Descriptor {
        serde_yaml::from_str(
            r"
ID: app
parameters:
  region: eu10
modules:
  - name: srv
    properties:
      LOG_LEVEL: info
      limits:
        memory: 256M
        disk: 1G
    requires:
      - name: db
    provides:
      - name: srv-api
resources:
  - name: db
    type: managed
    parameters:
      plan: lite
",
        )
        .unwrap()
    }

    fn extension(id: &str, extends: &str) -> ExtensionDescriptor {
        ExtensionDescriptor {
            id: id.to_string(),
            extends: extends.to_string(),
            ..ExtensionDescriptor::default()
        }
    }

    #[test]
    fn test_apply_extension_merges_maps() {
        let ext: ExtensionDescriptor = serde_yaml::from_str(
            r"
ID: app.prod
extends: app
parameters:
  region: us10
modules:
  - name: srv
    properties:
      LOG_LEVEL: warn
      limits:
        memory: 1G
    requires:
      - name: db
        properties:
          pool: 10
    provides:
      - name: srv-api
        properties:
          url: https://prod
resources:
  - name: db
    parameters:
      plan: hdi-shared
",
        )
        .unwrap();

        let mut descriptor = base();
        descriptor.apply_extension(&ext).unwrap();

        assert_eq!(descriptor.id, "app");
        assert_eq!(descriptor.parameters["region"], json!("us10"));
        let srv = descriptor.module("srv").unwrap();
        assert_eq!(srv.properties["LOG_LEVEL"], json!("warn"));
        assert_eq!(
            srv.properties["limits"],
            json!({"memory": "1G", "disk": "1G"})
        );
        assert_eq!(srv.requires("db").unwrap().properties["pool"], json!(10));
        assert_eq!(
            srv.provides("srv-api").unwrap().properties["url"],
            json!("https://prod")
        );
        assert_eq!(
            descriptor.resource("db").unwrap().parameters["plan"],
            json!("hdi-shared")
        );
    }

    #[test]
    fn test_apply_extension_unknown_module() {
        let mut ext = extension("app.ext", "app");
        ext.modules.push(ModuleExtension {
            name: "ghost".to_string(),
            ..ModuleExtension::default()
        });

        let err = base().apply_extension(&ext).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownModule {
                extension: "app.ext".to_string(),
                module: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_apply_extension_unknown_requires() {
        let mut ext = extension("app.ext", "app");
        ext.modules.push(ModuleExtension {
            name: "srv".to_string(),
            requires: vec![Requires::new("cache")],
            ..ModuleExtension::default()
        });

        let err = base().apply_extension(&ext).unwrap_err();
        assert!(matches!(err, DomainError::UnknownRequires { requires, .. } if requires == "cache"));
    }

    #[test]
    fn test_apply_extension_unknown_resource() {
        let mut ext = extension("app.ext", "app");
        ext.resources.push(ResourceExtension {
            name: "queue".to_string(),
            ..ResourceExtension::default()
        });

        let err = base().apply_extension(&ext).unwrap_err();
        assert!(matches!(err, DomainError::UnknownResource { resource, .. } if resource == "queue"));
    }

    #[test]
    fn test_order_extensions_builds_chain() {
        let ordered = order_extensions(
            "app",
            vec![
                extension("app.c", "app.b"),
                extension("app.a", "app"),
                extension("app.b", "app.a"),
            ],
        )
        .unwrap();

        let ids: Vec<_> = ordered.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["app.a", "app.b", "app.c"]);
    }

    #[test]
    fn test_order_extensions_unknown_parent() {
        let err = order_extensions(
            "app",
            vec![extension("app.a", "app"), extension("x", "other")],
        )
        .unwrap_err();

        assert_eq!(
            err,
            DomainError::UnknownExtends {
                extension: "x".to_string(),
                extends: "other".to_string(),
            }
        );
    }

    #[test]
    fn test_order_extensions_duplicate_parent() {
        let err = order_extensions(
            "app",
            vec![extension("app.a", "app"), extension("app.b", "app")],
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateExtends { .. }));
    }

    #[test]
    fn test_merge_extensions_applies_in_chain_order() {
        let mut second = extension("app.b", "app.a");
        second.parameters.insert("region".to_string(), json!("second"));
        let mut first = extension("app.a", "app");
        first.parameters.insert("region".to_string(), json!("first"));

        let mut descriptor = base();
        descriptor.merge_extensions(vec![second, first]).unwrap();

        assert_eq!(descriptor.parameters["region"], json!("second"));
    }
}
