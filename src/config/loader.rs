//! Policy loading functionality.
//!
//! This module provides the [`PolicyLoader`] type for loading a rotation
//! policy from a YAML file in a configuration directory.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::RotationPolicy;

/// Loads and provides access to the rotation policy.
///
/// # Directory Structure
///
/// ```text
/// config/rotation/
/// └── policy.yaml     # stability windows, history depth, repair cap, advisory timeout
/// ```
///
/// # Example
///
/// ```no_run
/// use rota_engine::config::PolicyLoader;
///
/// let loader = PolicyLoader::load("./config/rotation")?;
/// assert_eq!(loader.policy().stability_window(1), 3);
/// # Ok::<(), rota_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    policy: RotationPolicy,
}

impl PolicyLoader {
    /// Loads the policy from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g. "./config/rotation")
    ///
    /// # Returns
    ///
    /// Returns a `PolicyLoader` on success, or an error if the file is
    /// missing, is not valid YAML, or omits a required field.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let policy_path = path.as_ref().join("policy.yaml");
        let policy = Self::load_yaml::<RotationPolicy>(&policy_path)?;
        Ok(Self { policy })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded policy.
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Consumes the loader, returning the policy.
    pub fn into_policy(self) -> RotationPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_shipped_policy_matches_defaults() {
        let loader = PolicyLoader::load("./config/rotation").unwrap();
        assert_eq!(*loader.policy(), RotationPolicy::default());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = PolicyLoader::load("/nonexistent/path");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("policy.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {other:?}"),
        }
    }
}
