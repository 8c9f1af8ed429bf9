//! Application error types

use thiserror::Error;

use crate::ports::DescriptorError;

/// Application-level errors.
///
/// Only these abort a resolution run; unresolved references are reported as
/// diagnostics instead.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// No module name was given.
    #[error("module name must not be empty")]
    EmptyModuleName,

    /// The descriptor does not declare the requested module.
    #[error("module \"{0}\" not found in the descriptor")]
    ModuleNotFound(String),

    /// The descriptor or one of its extensions could not be loaded.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
