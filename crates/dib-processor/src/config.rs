//! Processor configuration
//!
//! [`ProcessorConfig`] is a builder, in the same spirit as the validation
//! configs used elsewhere: it starts from a crate name and source root and
//! collects optional settings. Build scripts use
//! [`ProcessorConfig::from_cargo_env`]; the optional `[processor]` table of
//! `dib.toml` and `DIB_PROCESSOR_*` variables are merged through figment.

use crate::{ProcessorError, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default runtime path referenced by generated glue
pub const DEFAULT_RUNTIME_PATH: &str = "::dib::runtime";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "dib.toml";

/// Environment variable prefix for processor settings
pub const PROCESSOR_ENV_PREFIX: &str = "DIB_PROCESSOR_";

/// Settings that may come from `dib.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorFileConfig {
    /// Glob patterns (relative to the source root) to skip
    pub exclude_patterns: Vec<String>,
    /// Path of the runtime crate in generated glue
    pub runtime_path: String,
}

impl Default for ProcessorFileConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
        }
    }
}

/// Configuration for one processing run
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Crate name (`-` is normalised to `_`)
    pub crate_name: String,
    /// Directory holding the crate sources (usually `<crate>/src`)
    pub source_root: PathBuf,
    /// Patterns to exclude from scanning
    pub exclude_patterns: Vec<String>,
    /// Path of the runtime crate in generated glue
    pub runtime_path: String,
    /// Output directory for emitted files
    pub out_dir: Option<PathBuf>,
}

impl ProcessorConfig {
    /// Create a config for a crate and its source root
    pub fn new(crate_name: impl Into<String>, source_root: impl Into<PathBuf>) -> Self {
        Self {
            crate_name: crate_name.into().replace('-', "_"),
            source_root: source_root.into(),
            exclude_patterns: Vec::new(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            out_dir: None,
        }
    }

    /// Add a pattern to exclude from scanning
    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Set the runtime crate path used by generated glue
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Set the output directory
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(out_dir.into());
        self
    }

    /// Build a config from the variables cargo sets for build scripts
    ///
    /// Reads `CARGO_PKG_NAME`, `CARGO_MANIFEST_DIR` and `OUT_DIR`, then merges
    /// `dib.toml` from the manifest directory if present.
    pub fn from_cargo_env() -> Result<Self> {
        let crate_name = cargo_var("CARGO_PKG_NAME")?;
        let manifest_dir = PathBuf::from(cargo_var("CARGO_MANIFEST_DIR")?);
        let out_dir = PathBuf::from(cargo_var("OUT_DIR")?);

        let config = Self::new(crate_name, manifest_dir.join("src")).with_out_dir(out_dir);
        config.merge_file(&manifest_dir.join(DEFAULT_CONFIG_FILENAME))
    }

    /// Merge settings from a TOML file's `[processor]` table and the environment
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn merge_file(mut self, path: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(ProcessorFileConfig {
            exclude_patterns: self.exclude_patterns.clone(),
            runtime_path: self.runtime_path.clone(),
        }));
        if path.exists() {
            figment = figment.merge(Figment::from(Toml::file(path)).focus("processor"));
        }
        figment = figment.merge(Env::prefixed(PROCESSOR_ENV_PREFIX));

        let file: ProcessorFileConfig = figment.extract().map_err(|e| {
            ProcessorError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        self.exclude_patterns = file.exclude_patterns;
        self.runtime_path = file.runtime_path;
        self.validate()?;
        Ok(self)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.crate_name.is_empty() {
            return Err(ProcessorError::config("Crate name cannot be empty"));
        }
        if self.runtime_path.trim().is_empty() {
            return Err(ProcessorError::config("Runtime path cannot be empty"));
        }
        syn::parse_str::<syn::Path>(&self.runtime_path).map_err(|e| {
            ProcessorError::config(format!("Invalid runtime path '{}': {e}", self.runtime_path))
        })?;
        Ok(())
    }

    /// Compile the exclude patterns
    pub fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

fn cargo_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ProcessorError::config(format!("{name} is not set; run from a build script")))
}
