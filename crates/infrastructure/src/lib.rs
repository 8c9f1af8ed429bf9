//! MTA Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::ProcessEnvironment;
pub use persistence::{FileDescriptorLoader, parse_env, read_env_file};
pub use serialization::{SerializationError, to_json_stable};
