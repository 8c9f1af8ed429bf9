//! File-based descriptor loader.
//!
//! Reads an `mta.yaml` descriptor and its `.mtaext` extensions from disk and
//! merges the extensions into the descriptor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use mta_application::ports::{DescriptorError, DescriptorLoader};
use mta_domain::{Descriptor, ExtensionDescriptor};

/// Loads descriptors from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDescriptorLoader;

impl FileDescriptorLoader {
    /// Creates a new file descriptor loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DescriptorLoader for FileDescriptorLoader {
    fn load(&self, path: &Path, extensions: &[PathBuf]) -> Result<Descriptor, DescriptorError> {
        let mut descriptor: Descriptor = read_yaml(path)?;
        debug!(
            path = %path.display(),
            id = %descriptor.id,
            modules = descriptor.modules.len(),
            resources = descriptor.resources.len(),
            "loaded descriptor"
        );

        if extensions.is_empty() {
            return Ok(descriptor);
        }

        let overlays = extensions
            .iter()
            .map(|extension| read_yaml::<ExtensionDescriptor>(extension))
            .collect::<Result<Vec<_>, _>>()?;
        descriptor.merge_extensions(overlays)?;
        debug!(extensions = extensions.len(), "merged extensions");

        Ok(descriptor)
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, DescriptorError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DescriptorError::NotFound(path.to_path_buf())
        } else {
            DescriptorError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| DescriptorError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use mta_domain::DomainError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    const MTA_YAML: &str = r"
_schema-version: '3.1'
ID: bookshop
version: 1.0.0
parameters:
  region: eu10
modules:
  - name: srv
    type: nodejs
    properties:
      LOG_LEVEL: info
resources:
  - name: db
    type: org.cloudfoundry.managed-service
";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_descriptor() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mta.yaml", MTA_YAML);

        let descriptor = FileDescriptorLoader::new().load(&path, &[]).unwrap();

        assert_eq!(descriptor.id, "bookshop");
        assert_eq!(descriptor.module_names().collect::<Vec<_>>(), vec!["srv"]);
        assert_eq!(descriptor.parameters["region"], json!("eu10"));
    }

    #[test]
    fn test_load_merges_extension_chain() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mta.yaml", MTA_YAML);
        let prod = write(
            &dir,
            "prod.mtaext",
            r"
ID: bookshop.prod
extends: bookshop.dev
modules:
  - name: srv
    properties:
      LOG_LEVEL: error
",
        );
        let dev = write(
            &dir,
            "dev.mtaext",
            r"
ID: bookshop.dev
extends: bookshop
parameters:
  region: us10
modules:
  - name: srv
    properties:
      LOG_LEVEL: debug
",
        );

        let descriptor = FileDescriptorLoader::new()
            .load(&path, &[prod, dev])
            .unwrap();

        assert_eq!(descriptor.parameters["region"], json!("us10"));
        assert_eq!(
            descriptor.module("srv").unwrap().properties["LOG_LEVEL"],
            json!("error")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FileDescriptorLoader::new()
            .load(&dir.path().join("mta.yaml"), &[])
            .unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mta.yaml", "modules: [unclosed");

        let err = FileDescriptorLoader::new().load(&path, &[]).unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
    }

    #[test]
    fn test_load_extension_for_unknown_module() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mta.yaml", MTA_YAML);
        let ext = write(
            &dir,
            "ext.mtaext",
            r"
ID: bookshop.ext
extends: bookshop
modules:
  - name: ghost
",
        );

        let err = FileDescriptorLoader::new().load(&path, &[ext]).unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::Merge(DomainError::UnknownModule { .. })
        ));
    }
}
