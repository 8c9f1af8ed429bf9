//! Service-binding matcher
//!
//! Associates declared resources with bound service instances found in a
//! `VCAP_SERVICES`-style catalog. An instance tagged
//! `mta-resource-name:<resource>` is bound to that resource, and its name
//! becomes the resource's `service-name` context entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mta_domain::context::{ResolutionContext, SERVICE_BINDINGS_KEY, SERVICE_NAME_KEY};

/// Tag prefix marking the resource a service instance is bound to.
pub const RESOURCE_TAG_PREFIX: &str = "mta-resource-name:";

/// A bound service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Service name.
    pub name: String,

    /// Service instance name.
    #[serde(default)]
    pub instance_name: Option<String>,

    /// Service broker label.
    #[serde(default)]
    pub label: Option<String>,

    /// Instance tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Service plan.
    #[serde(default)]
    pub plan: Option<String>,
}

impl ServiceInstance {
    /// Returns the resource this instance is bound to, if tagged.
    #[must_use]
    pub fn bound_resource(&self) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|tag| tag.strip_prefix(RESOURCE_TAG_PREFIX))
    }
}

/// Service instances grouped by broker label.
pub type ServiceCatalog = HashMap<String, Vec<ServiceInstance>>;

/// Parses a catalog payload.
///
/// # Errors
///
/// Returns the JSON error if the payload is not a valid catalog.
pub fn parse_catalog(payload: &str) -> Result<ServiceCatalog, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Returns `(resource, service name)` pairs for every tagged instance.
///
/// Pairs are sorted by label, then listed in catalog order.
#[must_use]
pub fn bound_resources(catalog: &ServiceCatalog) -> Vec<(String, String)> {
    let mut labels: Vec<&String> = catalog.keys().collect();
    labels.sort();

    labels
        .into_iter()
        .flat_map(|label| &catalog[label])
        .filter_map(|instance| {
            instance
                .bound_resource()
                .map(|resource| (resource.to_string(), instance.name.clone()))
        })
        .collect()
}

/// Writes `service-name` into the scope of every declared resource bound in
/// the context's `VCAP_SERVICES` entry. Returns the number of bindings applied.
///
/// A malformed payload is logged and contributes no bindings.
pub fn apply_service_bindings(context: &mut ResolutionContext) -> usize {
    let Some(payload) = context.global_value(SERVICE_BINDINGS_KEY) else {
        return 0;
    };

    let catalog = match parse_catalog(payload) {
        Ok(catalog) => catalog,
        Err(error) => {
            warn!(%error, "ignoring malformed {SERVICE_BINDINGS_KEY}");
            return 0;
        }
    };

    let mut applied = 0;
    for (resource, service) in bound_resources(&catalog) {
        if context.set_resource_value(&resource, SERVICE_NAME_KEY, &service) {
            debug!(%resource, %service, "bound service instance");
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use mta_domain::descriptor::{Descriptor, Resource};
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"{
        "hana": [
            {
                "name": "bookshop-db",
                "instance_name": "bookshop-db",
                "label": "hana",
                "tags": ["hana", "mta-resource-name:db"],
                "plan": "hdi-shared"
            }
        ],
        "xsuaa": [
            {
                "name": "bookshop-uaa",
                "label": "xsuaa",
                "tags": ["mta-resource-name:uaa"],
                "plan": "application"
            },
            {
                "name": "untagged",
                "label": "xsuaa",
                "tags": []
            }
        ]
    }"#;

    fn context() -> ResolutionContext {
        let mut descriptor = Descriptor::new("bookshop");
        descriptor.resources.push(Resource::new("db", "managed"));
        ResolutionContext::for_descriptor(&descriptor)
    }

    #[test]
    fn test_bound_resources() {
        let catalog = parse_catalog(CATALOG).unwrap();
        assert_eq!(
            bound_resources(&catalog),
            vec![
                ("db".to_string(), "bookshop-db".to_string()),
                ("uaa".to_string(), "bookshop-uaa".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply_binds_declared_resources_only() {
        let mut ctx = context();
        ctx.insert(SERVICE_BINDINGS_KEY, CATALOG);

        assert_eq!(apply_service_bindings(&mut ctx), 1);
        assert_eq!(ctx.resource_value("db", SERVICE_NAME_KEY), Some("bookshop-db"));
        assert_eq!(ctx.resource_value("uaa", SERVICE_NAME_KEY), None);
        assert_eq!(ctx.global_value("uaa/service-name"), None);
    }

    #[test]
    fn test_apply_without_payload() {
        let mut ctx = context();
        assert_eq!(apply_service_bindings(&mut ctx), 0);
    }

    #[test]
    fn test_apply_malformed_payload() {
        let mut ctx = context();
        ctx.insert(SERVICE_BINDINGS_KEY, "{not json");

        assert_eq!(apply_service_bindings(&mut ctx), 0);
        assert_eq!(ctx.resource_value("db", SERVICE_NAME_KEY), None);
    }

    #[test]
    fn test_bound_resource_tag() {
        let instance = ServiceInstance {
            name: "svc".to_string(),
            instance_name: None,
            label: None,
            tags: vec!["x".to_string(), "mta-resource-name:queue".to_string()],
            plan: None,
        };
        assert_eq!(instance.bound_resource(), Some("queue"));
    }
}
