//! MTA Domain - Core descriptor types
//!
//! This crate defines the domain model for MTA descriptor tooling:
//! the descriptor tree, extension overlays, canonical property values and
//! the resolution context. All types here are pure Rust with no I/O.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod value;

pub use context::{ResolutionContext, SERVICE_BINDINGS_KEY, SERVICE_NAME_KEY};
pub use descriptor::{
    Descriptor, ExtensionDescriptor, Module, ModuleExtension, Provides, Requires, Resource,
    ResourceExtension,
};
pub use error::{DomainError, DomainResult};
pub use value::{PropertyMap, canonicalize, value_to_string};
