//! Mutable injector used while bindings are registered

use super::frozen::FrozenInjector;
use super::{HostInjector, ProviderRegistration};
use crate::error::{BridgeError, Result};
use crate::factory::{Instance, Provider};
use dib_domain::{BindingDescriptor, BindingKey, Scope};
use std::any::Any;
use std::collections::HashMap;

/// How a binding produces its value
pub(super) enum Source {
    Provider(Provider),
    Instance(Instance),
}

/// One binding held by the injector
pub(super) struct Binding {
    pub(super) scope: Scope,
    pub(super) eager: bool,
    pub(super) dependencies: Vec<BindingKey>,
    pub(super) source: Source,
    pub(super) descriptor: Option<BindingDescriptor>,
}

impl Binding {
    fn describe(&self) -> String {
        match (&self.descriptor, &self.source) {
            (Some(d), _) => d.to_string(),
            (None, Source::Instance(i)) => format!("instance of {}", i.type_name()),
            (None, Source::Provider(_)) => format!("{} provider", self.scope),
        }
    }
}

/// Default host injector, registration phase
///
/// Bindings keep their registration order; [`Injector::freeze`] builds the
/// eager singletons in that order.
#[derive(Default)]
pub struct Injector {
    bindings: HashMap<BindingKey, Binding>,
    order: Vec<BindingKey>,
}

impl Injector {
    /// Create an empty injector
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under a key
    pub fn bind<V: Any + Send + Sync>(&mut self, key: BindingKey, value: V) -> Result<&mut Self> {
        self.bind_instance(key, Instance::new(value))?;
        Ok(self)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bound keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.order.iter()
    }

    /// Finish registration and build eager singletons
    pub fn freeze(self) -> Result<FrozenInjector> {
        FrozenInjector::freeze(self.bindings, self.order)
    }

    fn insert(&mut self, key: BindingKey, binding: Binding) -> Result<()> {
        if let Some(existing) = self.bindings.get(&key) {
            return Err(BridgeError::ConflictingBinding {
                key: key.to_string(),
                existing: existing.describe(),
                incoming: binding.describe(),
            });
        }
        tracing::trace!(key = %key, scope = %binding.scope, "Bound");
        self.order.push(key.clone());
        self.bindings.insert(key, binding);
        Ok(())
    }
}

impl HostInjector for Injector {
    fn register_provider(&mut self, registration: ProviderRegistration) -> Result<()> {
        if registration.eager && registration.scope != Scope::Singleton {
            return Err(BridgeError::configuration(format!(
                "{} is eager but {} scoped; only singletons can be eager",
                registration.key, registration.scope
            )));
        }
        self.insert(
            registration.key,
            Binding {
                scope: registration.scope,
                eager: registration.eager,
                dependencies: registration.dependencies,
                source: Source::Provider(registration.provider),
                descriptor: registration.descriptor,
            },
        )
    }

    fn contains(&self, key: &BindingKey) -> bool {
        self.bindings.contains_key(key)
    }

    fn bind_instance(&mut self, key: BindingKey, value: Instance) -> Result<()> {
        self.insert(
            key,
            Binding {
                scope: Scope::Singleton,
                eager: false,
                dependencies: Vec::new(),
                source: Source::Instance(value),
                descriptor: None,
            },
        )
    }

    fn descriptor(&self, key: &BindingKey) -> Option<&BindingDescriptor> {
        self.bindings.get(key).and_then(|b| b.descriptor.as_ref())
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("keys", &self.order)
            .finish_non_exhaustive()
    }
}
