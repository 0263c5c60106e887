//! Factory registry
//!
//! Every descriptor needs compiled code that builds its value. The glue
//! emitted by `dib-processor` submits one [`ComponentFactoryEntry`] per
//! descriptor to the [`COMPONENT_FACTORIES`] distributed slice; applications
//! and tests can add or override factories through [`FactoryRegistry`].

use crate::error::{BridgeError, Result};
use crate::injector::{Lazy, WeakInjector};
use dib_domain::{BindingDescriptor, BindingKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A bound value
///
/// Values are stored type-erased and cloned out on resolution, so a
/// component stored as `Arc<Foo>` is shared while the `Arc` is cloned.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wrap a value
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<V>(),
        }
    }

    /// Rust type name of the stored value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the stored value as `V`
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }

    /// Clone the stored value out as `V`
    pub fn get<V: Any + Clone>(&self, key: &BindingKey) -> Result<V> {
        self.downcast_ref::<V>()
            .cloned()
            .ok_or_else(|| BridgeError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<V>(),
                found: self.type_name,
            })
    }

    /// True when both handles share one stored value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Resolution backend seen by factories
pub(crate) trait Resolve: Sync {
    /// Resolve `key` on behalf of the bindings in `path`
    fn resolve(&self, key: &BindingKey, path: &[BindingKey]) -> Result<Instance>;

    /// True when `key` is bound
    fn contains(&self, key: &BindingKey) -> bool;

    /// Handle on the injector that does not keep it alive
    fn injector(&self) -> WeakInjector;
}

/// What a factory sees while its binding is built
pub struct ResolutionContext<'a> {
    resolver: &'a dyn Resolve,
    key: &'a BindingKey,
    dependencies: &'a [BindingKey],
    path: &'a [BindingKey],
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(
        resolver: &'a dyn Resolve,
        key: &'a BindingKey,
        dependencies: &'a [BindingKey],
        path: &'a [BindingKey],
    ) -> Self {
        Self {
            resolver,
            key,
            dependencies,
            path,
        }
    }

    /// Key of the binding being built
    pub fn key(&self) -> &BindingKey {
        self.key
    }

    /// Resolve the dependency at `position` and clone it out as `T`
    ///
    /// Resolution is lazy: the dependency is built (or fetched from its
    /// scope) only when the factory asks for it.
    pub fn dependency<T: Any + Clone>(&self, position: usize) -> Result<T> {
        let key = self.dependency_key(position)?;
        self.resolver.resolve(key, self.path)?.get(key)
    }

    /// Handle on the dependency at `position`, resolved when it is first used
    ///
    /// The handle does not take part in this construction, so it can close a
    /// dependency cycle.
    pub fn lazy<T: Any + Clone>(&self, position: usize) -> Result<Lazy<T>> {
        let key = self.dependency_key(position)?;
        Ok(Lazy::new(self.resolver.injector(), key.clone()))
    }

    /// Resolve the dependency at `position`, `None` when it is not bound
    pub fn optional_dependency<T: Any + Clone>(&self, position: usize) -> Result<Option<T>> {
        let key = self.dependency_key(position)?;
        if !self.resolver.contains(key) {
            tracing::trace!(key = %key, requester = %self.key, "Optional dependency not bound");
            return Ok(None);
        }
        self.resolver.resolve(key, self.path)?.get(key).map(Some)
    }

    fn dependency_key(&self, position: usize) -> Result<&'a BindingKey> {
        self.dependencies.get(position).ok_or_else(|| {
            BridgeError::provider(
                self.key,
                format!(
                    "no dependency at position {position} ({} declared)",
                    self.dependencies.len()
                ),
            )
        })
    }
}

/// Builds the value of one binding
pub type Provider = Arc<dyn Fn(&ResolutionContext<'_>) -> Result<Instance> + Send + Sync>;

/// Compiled factory submitted by generated glue
pub type FactoryFn = fn(&ResolutionContext<'_>) -> Result<Instance>;

/// Registry entry for one descriptor's factory
///
/// Generated glue registers entries with
/// `#[linkme::distributed_slice(COMPONENT_FACTORIES)]`.
pub struct ComponentFactoryEntry {
    /// Canonical type name of the bound key
    pub type_name: &'static str,
    /// Qualifier of the bound key
    pub qualifier: Option<&'static str>,
    /// Crate that declared the binding
    pub crate_name: &'static str,
    /// Arena id of the descriptor in its registration
    pub descriptor: u32,
    /// Factory function
    pub factory: FactoryFn,
}

impl ComponentFactoryEntry {
    /// True when this entry builds `key`
    pub fn matches(&self, key: &BindingKey) -> bool {
        self.type_name == key.type_name && self.qualifier == key.qualifier.as_deref()
    }
}

// Auto-collection via linkme distributed slices - glue submits entries at link time
#[linkme::distributed_slice]
pub static COMPONENT_FACTORIES: [ComponentFactoryEntry] = [..];

/// Factories available to the bridge
///
/// Explicit factories take precedence over linked entries.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    explicit: Vec<(BindingKey, Provider)>,
    linked: Vec<&'static ComponentFactoryEntry>,
}

impl FactoryRegistry {
    /// Registry holding every linked entry
    pub fn linked() -> Self {
        Self {
            explicit: Vec::new(),
            linked: COMPONENT_FACTORIES.iter().collect(),
        }
    }

    /// Empty registry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a factory for a key, replacing earlier explicit ones
    pub fn register<F>(&mut self, key: BindingKey, factory: F) -> &mut Self
    where
        F: Fn(&ResolutionContext<'_>) -> Result<Instance> + Send + Sync + 'static,
    {
        let provider: Provider = Arc::new(factory);
        self.explicit.retain(|(k, _)| *k != key);
        self.explicit.push((key, provider));
        self
    }

    /// Builder form of [`FactoryRegistry::register`]
    pub fn with<F>(mut self, key: BindingKey, factory: F) -> Self
    where
        F: Fn(&ResolutionContext<'_>) -> Result<Instance> + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }

    /// Number of known factories
    pub fn len(&self) -> usize {
        self.explicit.len() + self.linked.len()
    }

    /// True when no factory is known
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Factory for a descriptor of a crate's registration
    ///
    /// Linked entries are matched on crate and arena id first; a key-only
    /// match is accepted when it is unique.
    pub fn provider_for(&self, crate_name: &str, descriptor: &BindingDescriptor) -> Option<Provider> {
        let key = &descriptor.key;
        if let Some((_, provider)) = self.explicit.iter().find(|(k, _)| k == key) {
            return Some(Arc::clone(provider));
        }

        let exact = self.linked.iter().find(|e| {
            e.crate_name == crate_name && e.descriptor == descriptor.id.0 && e.matches(key)
        });
        let entry = match exact {
            Some(entry) => Some(*entry),
            None => {
                let mut by_key = self.linked.iter().filter(|e| e.matches(key));
                match (by_key.next(), by_key.next()) {
                    (Some(only), None) => Some(*only),
                    _ => None,
                }
            }
        }?;
        let provider: Provider = Arc::new(entry.factory);
        Some(provider)
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field(
                "explicit",
                &self.explicit.iter().map(|(k, _)| k.to_string()).collect::<Vec<_>>(),
            )
            .field("linked", &self.linked.len())
            .finish()
    }
}
