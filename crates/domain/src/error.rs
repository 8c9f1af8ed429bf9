//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while combining descriptors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An extension references a module that the descriptor does not declare.
    #[error("module \"{module}\" referenced by extension \"{extension}\" was not found")]
    UnknownModule {
        /// ID of the extension descriptor.
        extension: String,
        /// Name of the missing module.
        module: String,
    },

    /// An extension references a resource that the descriptor does not declare.
    #[error("resource \"{resource}\" referenced by extension \"{extension}\" was not found")]
    UnknownResource {
        /// ID of the extension descriptor.
        extension: String,
        /// Name of the missing resource.
        resource: String,
    },

    /// An extension references a requires entry that the module does not declare.
    #[error("requires \"{requires}\" of module \"{module}\" referenced by extension \"{extension}\" was not found")]
    UnknownRequires {
        /// ID of the extension descriptor.
        extension: String,
        /// Name of the owning module.
        module: String,
        /// Name of the missing requires entry.
        requires: String,
    },

    /// An extension references a provides entry that the module does not declare.
    #[error("provides \"{provides}\" of module \"{module}\" referenced by extension \"{extension}\" was not found")]
    UnknownProvides {
        /// ID of the extension descriptor.
        extension: String,
        /// Name of the owning module.
        module: String,
        /// Name of the missing provides entry.
        provides: String,
    },

    /// An extension extends an ID that is not part of the extension chain.
    #[error("extension \"{extension}\" extends unknown descriptor \"{extends}\"")]
    UnknownExtends {
        /// ID of the extension descriptor.
        extension: String,
        /// The ID it claims to extend.
        extends: String,
    },

    /// More than one extension extends the same descriptor.
    #[error("extensions \"{first}\" and \"{second}\" both extend \"{extends}\"")]
    DuplicateExtends {
        /// ID of the first extension.
        first: String,
        /// ID of the second extension.
        second: String,
        /// The shared parent ID.
        extends: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
