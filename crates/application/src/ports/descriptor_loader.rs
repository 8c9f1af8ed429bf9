//! Descriptor loader port
//!
//! Defines the interface for loading a descriptor together with its
//! extension overlays.

use std::path::{Path, PathBuf};

use mta_domain::{Descriptor, DomainError};

/// Errors that can occur while loading a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The file does not exist.
    #[error("descriptor file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid descriptor or extension.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The extensions could not be merged into the descriptor.
    #[error("failed to merge extensions: {0}")]
    Merge(#[from] DomainError),
}

/// Loads descriptors from storage.
pub trait DescriptorLoader {
    /// Loads the descriptor at `path` and merges the extensions at
    /// `extensions` into it.
    ///
    /// # Errors
    /// Returns an error if any file is missing, unreadable or invalid, or if
    /// the extensions do not apply to the descriptor.
    fn load(&self, path: &Path, extensions: &[PathBuf]) -> Result<Descriptor, DescriptorError>;
}
