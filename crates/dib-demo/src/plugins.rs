//! Plugins contributed to a set

use dib::{injectable, module, singleton};
use std::sync::Arc;

/// Extension loaded by the [`PluginHost`]
pub trait Plugin: Send + Sync {
    /// Plugin name
    fn name(&self) -> &'static str;
}

struct Audit;

impl Plugin for Audit {
    fn name(&self) -> &'static str {
        "audit"
    }
}

struct Metrics;

impl Plugin for Metrics {
    fn name(&self) -> &'static str {
        "metrics"
    }
}

/// Contributes the built-in plugins
#[derive(Debug, Default)]
pub struct BuiltinPlugins;

#[module]
impl BuiltinPlugins {
    #[dib::provides(into_set)]
    pub fn audit() -> Arc<dyn Plugin + Send + Sync> {
        Arc::new(Audit)
    }

    #[dib::provides(into_set)]
    pub fn metrics() -> Arc<dyn Plugin + Send + Sync> {
        Arc::new(Metrics)
    }
}

/// Holds every contributed plugin
#[injectable]
#[singleton]
pub struct PluginHost {
    plugins: Vec<Arc<dyn Plugin + Send + Sync>>,
}

#[injectable]
impl PluginHost {
    #[dib::inject]
    pub fn new(plugins: Vec<Arc<dyn Plugin + Send + Sync>>) -> Self {
        Self { plugins }
    }

    /// Names of the loaded plugins
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}
