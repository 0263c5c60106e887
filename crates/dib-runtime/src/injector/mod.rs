//! Host injector port and the default container
//!
//! The bridge only talks to the host through [`HostInjector`]: register a
//! provider for a key with a scope and a dependency list, check whether a key
//! is bound, bind a ready-made instance. [`Injector`] is the default host; it
//! is mutable while bindings are registered and turns into the read-only
//! [`FrozenInjector`] once startup completes. [`Lazy`] handles defer a
//! dependency until after construction.

mod container;
mod frozen;
mod lazy;

pub use container::Injector;
pub use frozen::{FrozenInjector, RequestScope};
pub use lazy::Lazy;

pub(crate) use frozen::WeakInjector;

use crate::error::Result;
use crate::factory::{Instance, Provider};
use dib_domain::{BindingDescriptor, BindingKey, Scope};

/// Everything the host needs to bind one provider
#[derive(Clone)]
pub struct ProviderRegistration {
    /// Key to bind
    pub key: BindingKey,
    /// Lifecycle of the provided value
    pub scope: Scope,
    /// Build when the injector is frozen (singletons only)
    pub eager: bool,
    /// Keys resolved through the context, in position order
    pub dependencies: Vec<BindingKey>,
    /// Builds the value
    pub provider: Provider,
    /// Descriptor the registration came from, when bridged
    pub descriptor: Option<BindingDescriptor>,
}

impl std::fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("eager", &self.eager)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Injector the bridge registers bindings into
pub trait HostInjector {
    /// Register a provider for `registration.key`
    fn register_provider(&mut self, registration: ProviderRegistration) -> Result<()>;

    /// True when `key` is bound
    fn contains(&self, key: &BindingKey) -> bool;

    /// Bind a ready-made value as a singleton
    fn bind_instance(&mut self, key: BindingKey, value: Instance) -> Result<()>;

    /// Descriptor a key was bridged from, if the host keeps it
    fn descriptor(&self, _key: &BindingKey) -> Option<&BindingDescriptor> {
        None
    }
}
