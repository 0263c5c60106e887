//! Configuration loader
//!
//! Loads [`BridgeConfig`] from defaults, a TOML file and environment
//! variables, in that order of precedence (later sources override earlier).

use super::BridgeConfig;
use crate::constants::{CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_FILENAME};
use crate::error::{BridgeError, Result};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// 1. Default values from `BridgeConfig::default()`
    /// 2. TOML configuration file (explicit path, or `./dib.toml` if present)
    /// 3. Environment variables with prefix, nested keys split on `__`
    ///    (e.g. `DIB_LOGGING__LEVEL=debug`)
    pub fn load(&self) -> Result<BridgeConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(BridgeConfig::default()));
        let mut loaded_file: Option<PathBuf> = None;

        match &self.config_path {
            Some(path) if path.exists() => {
                figment = figment.merge(Toml::file(path));
                log_config_loaded(path, true);
                loaded_file = Some(path.clone());
            }
            Some(path) => log_config_loaded(path, false),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(&default_path));
                    log_config_loaded(&default_path, true);
                    loaded_file = Some(default_path);
                }
            }
        }

        figment = figment
            .merge(Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR));

        let config: BridgeConfig = figment.extract().with_context(|| match &loaded_file {
            Some(path) => format!("Failed to extract bridge configuration from {}", path.display()),
            None => "Failed to extract bridge configuration".to_string(),
        })?;

        validate_bridge_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &BridgeConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context(format!(
            "Failed to write config file {}",
            path.as_ref().display()
        ))?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate bridge configuration
fn validate_bridge_config(config: &BridgeConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    if config.artifacts.iter().any(|p| p.as_os_str().is_empty()) {
        return Err(BridgeError::configuration("Artifact paths cannot be empty"));
    }
    if config.active_environments.iter().any(|e| e.trim().is_empty()) {
        return Err(BridgeError::configuration(
            "Active environment names cannot be empty",
        ));
    }
    Ok(())
}
