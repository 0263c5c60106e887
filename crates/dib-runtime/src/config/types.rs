//! Configuration types

use crate::constants::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Registration artifacts loaded by `load_configured_artifacts`
    pub artifacts: Vec<PathBuf>,
    /// Environments whose bindings are registered
    ///
    /// Bindings without environments are always registered.
    pub active_environments: Vec<String>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Add an artifact path
    pub fn with_artifact<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.artifacts.push(path.into());
        self
    }

    /// Activate an environment
    pub fn with_environment<S: Into<String>>(mut self, environment: S) -> Self {
        self.active_environments.push(environment.into());
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
        }
    }
}
