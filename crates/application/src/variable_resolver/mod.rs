//! Variable resolution module
//!
//! Resolves `~{provider/name}` requires-variables and `${name}` placeholders
//! in descriptor property values.
//!
//! # Usage
//!
//! ```
//! use mta_application::variable_resolver::{ExpressionKind, Scope, VariableResolver};
//! use mta_domain::{Descriptor, Module, ResolutionContext};
//! use serde_json::json;
//!
//! let mut module = Module::new("srv", "nodejs");
//! module.parameters.insert("host".to_string(), json!("localhost"));
//! let mut descriptor = Descriptor::new("app");
//! descriptor.modules.push(module);
//!
//! let context = ResolutionContext::for_descriptor(&descriptor);
//! let mut resolver = VariableResolver::new(&descriptor, &context);
//!
//! let mut value = json!("http://${host}/api");
//! let scope = Scope::module(descriptor.module("srv").unwrap());
//! resolver.resolve_value(&mut value, scope, ExpressionKind::Placeholder);
//! assert_eq!(value, json!("http://localhost/api"));
//! ```

pub mod diagnostics;
pub mod engine;
pub mod parser;
pub mod provider;
pub mod service_binding;

pub use diagnostics::{Diagnostics, Unresolved};
pub use engine::{Scope, VariableResolver};
pub use parser::{ExpressionKind, ExpressionMatch, find_expression};
pub use provider::{ProviderSource, find_provider};
pub use service_binding::{
    RESOURCE_TAG_PREFIX, ServiceCatalog, ServiceInstance, apply_service_bindings,
    bound_resources, parse_catalog,
};
