//! Runtime bridge
//!
//! Loads module registrations and registers every descriptor into a host
//! injector as a provider. Dependencies are passed to the host as keys only;
//! the host resolves them lazily through its own graph when a binding is first
//! built.
//!
//! ```text
//! Uninitialized ──load──► Loading ──register──► Registering ──► Ready
//!                                                    │
//!                                                    └──► Failed (terminal)
//! ```

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::factory::FactoryRegistry;
use crate::injector::{FrozenInjector, HostInjector, Injector, ProviderRegistration};
use dib_domain::{BindingDescriptor, BindingKey, ModuleRegistration};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a [`RuntimeBridge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    /// Nothing loaded yet
    Uninitialized,
    /// Registrations are being loaded
    Loading,
    /// Descriptors are being registered into the host
    Registering,
    /// Every loaded descriptor is bound
    Ready,
    /// Startup failed; the bridge accepts no further calls
    Failed,
}

impl BridgeState {
    /// Lowercase state name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Registering => "registering",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bridge between module registrations and a host injector
///
/// # Example
///
/// ```ignore
/// let mut bridge = RuntimeBridge::new(BridgeConfig::default());
/// bridge.load_json(crate::DIB_REGISTRATION_JSON)?;
/// let injector = bridge.start(Injector::new())?;
/// let service: Arc<Service> = injector.get_type("app::Service")?;
/// ```
#[derive(Debug)]
pub struct RuntimeBridge {
    config: BridgeConfig,
    factories: FactoryRegistry,
    state: BridgeState,
    pending: Vec<ModuleRegistration>,
    registered: Vec<ModuleRegistration>,
    fingerprints: HashSet<String>,
    bound: Vec<BindingKey>,
}

impl RuntimeBridge {
    /// Create a bridge using every linked factory
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            factories: FactoryRegistry::linked(),
            state: BridgeState::Uninitialized,
            pending: Vec::new(),
            registered: Vec::new(),
            fingerprints: HashSet::new(),
            bound: Vec::new(),
        }
    }

    /// Replace the factory registry
    pub fn with_factories(mut self, factories: FactoryRegistry) -> Self {
        self.factories = factories;
        self
    }

    /// Current state
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Keys bound by this bridge, in registration order
    pub fn bound_keys(&self) -> &[BindingKey] {
        &self.bound
    }

    /// Registrations already registered into a host
    pub fn registrations(&self) -> &[ModuleRegistration] {
        &self.registered
    }

    /// Queue a registration
    ///
    /// A registration whose fingerprint was already loaded is skipped.
    pub fn load_registration(&mut self, registration: ModuleRegistration) -> Result<()> {
        self.enter_loading("load a registration")?;
        if let Err(e) = registration.verify() {
            return Err(self.fail(e.into()));
        }
        if !self.fingerprints.insert(registration.fingerprint.clone()) {
            debug!(
                crate_name = %registration.crate_name,
                "Registration already loaded, skipping"
            );
            return Ok(());
        }
        info!(
            crate_name = %registration.crate_name,
            descriptors = registration.len(),
            "Registration loaded"
        );
        self.pending.push(registration);
        Ok(())
    }

    /// Parse and queue a registration from its JSON artifact text
    ///
    /// Generated glue embeds the artifact as `DIB_REGISTRATION_JSON`.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.enter_loading("load a registration")?;
        match ModuleRegistration::from_json(json) {
            Ok(registration) => self.load_registration(registration),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Read and queue a registration artifact file
    pub fn load_artifact(&mut self, path: &Path) -> Result<()> {
        self.enter_loading("load an artifact")?;
        match ModuleRegistration::read_from(path) {
            Ok(registration) => self.load_registration(registration),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Queue every artifact listed in the configuration
    pub fn load_configured_artifacts(&mut self) -> Result<()> {
        self.enter_loading("load configured artifacts")?;
        let artifacts = self.config.artifacts.clone();
        for path in &artifacts {
            self.load_artifact(path)?;
        }
        Ok(())
    }

    /// Register every queued descriptor into the host injector
    ///
    /// Descriptors of inactive environments are skipped. A key the host
    /// already binds with the same descriptor is skipped; with anything else
    /// it is a conflict. Once all providers are registered, every required
    /// dependency must be bound in the host. Optional ones, such as set
    /// contributions of an inactive environment, may stay unbound.
    pub fn register<H: HostInjector + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        match self.state {
            BridgeState::Loading | BridgeState::Ready => {}
            state => {
                return Err(BridgeError::InvalidState {
                    operation: "register",
                    state,
                });
            }
        }
        self.state = BridgeState::Registering;
        info!(registrations = self.pending.len(), "Registering bindings");

        match self.register_pending(host) {
            Ok(count) => {
                self.state = BridgeState::Ready;
                info!(registered = count, bound = self.bound.len(), "Bridge ready");
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Load configured artifacts, register into `injector` and freeze it
    ///
    /// Eager singletons are built while freezing; a failing one fails the
    /// bridge.
    pub fn start(&mut self, mut injector: Injector) -> Result<FrozenInjector> {
        self.load_configured_artifacts()?;
        self.register(&mut injector)?;
        injector.freeze().map_err(|e| self.fail(e))
    }

    fn register_pending<H: HostInjector + ?Sized>(&mut self, host: &mut H) -> Result<usize> {
        let pending = std::mem::take(&mut self.pending);
        let mut added: Vec<&BindingDescriptor> = Vec::new();

        for registration in &pending {
            for descriptor in registration.iter() {
                if !descriptor.is_active_in(&self.config.active_environments) {
                    warn!(
                        key = %descriptor.key,
                        environments = ?descriptor.environments,
                        "Skipping binding of inactive environment"
                    );
                    continue;
                }
                if host.contains(&descriptor.key) {
                    Self::check_rebind(host, descriptor)?;
                    debug!(key = %descriptor.key, "Already bound, skipping");
                    self.note_bound(&descriptor.key);
                    continue;
                }

                let provider = self
                    .factories
                    .provider_for(&registration.crate_name, descriptor)
                    .ok_or_else(|| BridgeError::missing_factory(&descriptor.key))?;
                host.register_provider(ProviderRegistration {
                    key: descriptor.key.clone(),
                    scope: descriptor.scope,
                    eager: descriptor.eager,
                    dependencies: descriptor.dependencies.iter().map(|d| d.key.clone()).collect(),
                    provider,
                    descriptor: Some(descriptor.clone()),
                })?;
                debug!(
                    key = %descriptor.key,
                    scope = %descriptor.scope,
                    dependencies = descriptor.dependencies.len(),
                    "Registered provider"
                );
                self.note_bound(&descriptor.key);
                added.push(descriptor);
            }
        }

        for descriptor in &added {
            if let Some(missing) = descriptor
                .dependencies
                .iter()
                .find(|d| d.is_required() && !host.contains(&d.key))
            {
                return Err(BridgeError::unresolved_binding(&missing.key, &descriptor.key));
            }
        }

        let count = added.len();
        self.registered.extend(pending);
        Ok(count)
    }

    fn check_rebind<H: HostInjector + ?Sized>(host: &H, incoming: &BindingDescriptor) -> Result<()> {
        match host.descriptor(&incoming.key) {
            Some(existing) if existing.same_binding(incoming) => Ok(()),
            Some(existing) => Err(BridgeError::ConflictingBinding {
                key: incoming.key.to_string(),
                existing: existing.to_string(),
                incoming: incoming.to_string(),
            }),
            None => Err(BridgeError::ConflictingBinding {
                key: incoming.key.to_string(),
                existing: "binding owned by the host".to_string(),
                incoming: incoming.to_string(),
            }),
        }
    }

    fn note_bound(&mut self, key: &BindingKey) {
        if !self.bound.contains(key) {
            self.bound.push(key.clone());
        }
    }

    fn enter_loading(&mut self, operation: &'static str) -> Result<()> {
        match self.state {
            BridgeState::Failed | BridgeState::Registering => Err(BridgeError::InvalidState {
                operation,
                state: self.state,
            }),
            BridgeState::Uninitialized | BridgeState::Ready => {
                self.state = BridgeState::Loading;
                Ok(())
            }
            BridgeState::Loading => Ok(()),
        }
    }

    fn fail(&mut self, err: BridgeError) -> BridgeError {
        self.state = BridgeState::Failed;
        error!(error = %err, "Bridge failed");
        err
    }
}
