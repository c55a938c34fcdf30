//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading leave policies
//! from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    EntitlementsConfig, LeavePolicy, PolicyMetadata, RolesConfig, TenureConfig,
};

/// Loads and provides access to a leave policy.
///
/// # Directory Structure
///
/// ```text
/// config/bcea/
/// ├── policy.yaml        # Policy metadata
/// ├── entitlements.yaml  # Base table, accruing set, carry-over rule
/// ├── roles.yaml         # Managerial overrides and special adjustments
/// └── tenure.yaml        # Tenure ladder
/// ```
///
/// # Example
///
/// ```no_run
/// use leave_engine::config::ConfigLoader;
/// use leave_engine::models::LeaveType;
///
/// let loader = ConfigLoader::load("./config/bcea")?;
/// let vacation = loader.policy().base().get(LeaveType::Vacation);
/// println!("Base vacation days: {}", vacation);
/// # Ok::<(), leave_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    policy: LeavePolicy,
}

impl ConfigLoader {
    /// Loads a policy from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or misses a field (`ConfigParseError`)
    /// - The tables are inconsistent (`InvalidPolicy`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<PolicyMetadata>(&path.join("policy.yaml"))?;
        let entitlements = Self::load_yaml::<EntitlementsConfig>(&path.join("entitlements.yaml"))?;
        let roles = Self::load_yaml::<RolesConfig>(&path.join("roles.yaml"))?;
        let tenure = Self::load_yaml::<TenureConfig>(&path.join("tenure.yaml"))?;

        let policy = LeavePolicy::new(metadata, entitlements, roles, tenure)?;

        tracing::debug!(
            policy = %policy.metadata().code,
            version = %policy.metadata().version,
            path = %path.display(),
            "Loaded leave policy"
        );

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
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    /// Consumes the loader, returning the policy.
    pub fn into_policy(self) -> LeavePolicy {
        self.policy
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        self.policy.metadata()
    }
}
