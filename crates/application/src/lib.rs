//! MTA Application - Use cases and ports
//!
//! This crate holds the resolution engine and the use cases built on it.
//! I/O happens behind the traits in [`ports`], implemented by the
//! infrastructure layer.

pub mod error;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{DescriptorError, DescriptorLoader, EnvironmentError, EnvironmentSource};
pub use use_cases::{
    DEFAULT_ENV_FILE, ResolveModule, ResolveModuleInput, ResolveModuleOutput, build_context,
    flatten_properties, resolve_module,
};
pub use variable_resolver::{Diagnostics, Scope, Unresolved, VariableResolver};
