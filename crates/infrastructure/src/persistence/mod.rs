//! File system persistence adapters.

mod descriptor_loader;
pub mod env_file;

pub use descriptor_loader::FileDescriptorLoader;
pub use env_file::{parse_env, read_env_file};
