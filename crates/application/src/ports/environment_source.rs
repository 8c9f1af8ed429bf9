//! Environment source port
//!
//! Supplies the externally configured values that seed the resolution
//! context: process environment variables and `.env` files.

use std::path::Path;

/// Errors that can occur while reading an environment file.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of environment entries.
pub trait EnvironmentSource {
    /// Returns the process environment as `(name, value)` pairs.
    fn variables(&self) -> Vec<(String, String)>;

    /// Reads the `(name, value)` entries of the environment file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn env_file(&self, path: &Path) -> Result<Vec<(String, String)>, EnvironmentError>;
}
