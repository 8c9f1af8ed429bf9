//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod descriptor_loader;
mod environment_source;

pub use descriptor_loader::{DescriptorError, DescriptorLoader};
pub use environment_source::{EnvironmentError, EnvironmentSource};
