//! Process environment adapter

use std::path::Path;

use tracing::debug;

use mta_application::ports::{EnvironmentError, EnvironmentSource};

use crate::persistence::read_env_file;

/// Environment source backed by the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    /// Creates a new process environment source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EnvironmentSource for ProcessEnvironment {
    fn variables(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    debug!(?key, "skipping non UTF-8 environment variable");
                    None
                }
            })
            .collect()
    }

    fn env_file(&self, path: &Path) -> Result<Vec<(String, String)>, EnvironmentError> {
        Ok(read_env_file(path)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_variables_include_path() {
        let variables = ProcessEnvironment::new().variables();
        let expected = std::env::var("PATH").ok();
        let actual = variables
            .iter()
            .find(|(key, _)| key == "PATH")
            .map(|(_, value)| value.clone());
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "srv/PORT=8080\n").unwrap();

        let entries = ProcessEnvironment::new().env_file(&path).unwrap();
        assert_eq!(entries, vec![("srv/PORT".to_string(), "8080".to_string())]);
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessEnvironment::new()
            .env_file(&dir.path().join(".env"))
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::Io(_)));
    }
}
